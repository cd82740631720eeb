pub mod assets;

pub mod isa;

pub mod assembler;

pub mod cli;
