use std::path::PathBuf;

pub const DEFAULT_SOURCE_EXT: &str = "rva";
pub const DEFAULT_BINARY_EXT: &str = "rvb";

pub fn default_sample_dir() -> PathBuf {
    ["asm"].iter().collect()
}

/// Computes 10! into `R1` and shows it.
pub static SAMPLE_PROGRAM: &str = include_str!("../asm/factorial.rva");
