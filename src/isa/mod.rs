pub mod hw;
pub mod opcode;
pub mod reg;

pub use hw::Word;
pub use opcode::{InstructionSet, Opcode, Rule};
pub use reg::Register;
