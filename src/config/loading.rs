use std::collections::HashMap;
use std::path::Path;

use super::{Config, Error};

/// Environment variables, credentials and zone fall back to them when the
/// config file and flags leave them empty.
pub fn environment() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| match (k.into_string(), v.into_string()) {
            (Ok(k), Ok(v)) => Some((k, v)),
            _ => None,
        })
        .collect()
}

pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let content = std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_path_buf(),
        err,
    })?;

    load_from_str(&content)
}

/// Parse the config as is, `$` has no special meaning in it.
pub fn load_from_str(content: &str) -> Result<Config, Error> {
    serde_yaml::from_str(content).map_err(Error::Parse)
}
