use std::path::PathBuf;

use rand::Rng;
use rand::distr::Alphanumeric;

pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
}

/// A random path in the temp dir, nothing is created.
pub fn temp_file() -> PathBuf {
    std::env::temp_dir().join(random_string(16))
}

/// Create an empty directory with a random name in the temp dir.
pub fn temp_dir() -> PathBuf {
    let path = temp_file();
    std::fs::create_dir_all(&path).expect("create temp dir");
    path
}
