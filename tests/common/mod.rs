use rvasm::assets;
use std::path::PathBuf;

pub fn sample_path(name: &str) -> PathBuf {
    assets::default_sample_dir()
        .join(name)
        .with_extension(assets::DEFAULT_SOURCE_EXT)
}

pub fn sample(name: &str) -> String {
    std::fs::read_to_string(sample_path(name)).unwrap()
}

/// A path under the system temp dir which does not exist yet.
pub fn scratch_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rvasm-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path
}
