mod loading;
mod secret;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

pub use loading::{environment, load_from_path, load_from_str};
pub use secret::SecretString;

use crate::sacloud::DEFAULT_API_ROOT_URL;

pub const TOKEN_ENV: &str = "SAKURACLOUD_ACCESS_TOKEN";
pub const SECRET_ENV: &str = "SAKURACLOUD_ACCESS_TOKEN_SECRET";
pub const ZONE_ENV: &str = "SAKURACLOUD_ZONE";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read config file {path:?} failed, {err}")]
    Read { path: PathBuf, err: std::io::Error },
    #[error("parse config failed, {0}")]
    Parse(serde_yaml::Error),
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Which server attribute is used as the `hostname` label.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<String>")]
pub enum HostnameMode {
    /// The host name set when the disk was modified, `modify_disk` in config
    HostName,
    /// The display name of the server, `server_name` in config
    #[default]
    Name,
}

impl From<Option<String>> for HostnameMode {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("modify_disk") => HostnameMode::HostName,
            None | Some("") | Some("server_name") => HostnameMode::Name,
            Some(other) => {
                warn!(
                    message = "unknown host_name_type, fallback to server_name",
                    host_name_type = other
                );

                HostnameMode::Name
            }
        }
    }
}

/// Describes one class of servers to monitor, and how to address and label
/// them.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TargetRule {
    /// Value of the `service` label
    #[serde(default)]
    pub service: String,

    /// Servers must have all of these tags, they are appended to `base_tags`
    #[serde(default)]
    pub tags: Vec<String>,

    /// Servers which have any of these tags are skipped
    #[serde(default)]
    pub ignore_tags: Vec<String>,

    /// One target is generated for each port
    #[serde(default)]
    pub ports: Vec<u16>,

    /// Which interface's user IP address is preferred, start from 0
    #[serde(default)]
    pub interface_index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "sacloud_token")]
    pub token: SecretString,

    #[serde(rename = "sacloud_token_secret")]
    pub secret: SecretString,

    #[serde(rename = "sacloud_zone")]
    pub zone: String,

    /// Where the Sakura Cloud API is, zone and path are appended to it
    #[serde(rename = "sacloud_api_root_url")]
    pub api_root_url: String,

    /// Tags every target rule requires
    pub base_tags: Vec<String>,

    pub targets: Vec<TargetRule>,

    #[serde(rename = "host_name_type")]
    pub hostname_mode: HostnameMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            token: SecretString::default(),
            secret: SecretString::default(),
            zone: String::new(),
            api_root_url: DEFAULT_API_ROOT_URL.to_string(),
            base_tags: vec![],
            targets: vec![],
            hostname_mode: HostnameMode::default(),
        }
    }
}

/// Settings from the command line, empty values are ignored.
#[derive(Debug, Default)]
pub struct Overrides {
    pub token: String,
    pub secret: String,
    pub zone: String,
}

fn first_non_empty(candidates: [Option<&str>; 2]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .map(ToString::to_string)
}

impl Config {
    /// Fill credentials and zone which are not set in the config file, from
    /// command line flags first and then environment variables.
    pub fn merge(&mut self, overrides: &Overrides, vars: &HashMap<String, String>) {
        let env = |key: &str| vars.get(key).map(String::as_str);

        if self.token.is_empty()
            && let Some(token) = first_non_empty([Some(overrides.token.as_str()), env(TOKEN_ENV)])
        {
            self.token = token.into();
        }

        if self.secret.is_empty()
            && let Some(secret) = first_non_empty([Some(overrides.secret.as_str()), env(SECRET_ENV)])
        {
            self.secret = secret.into();
        }

        if self.zone.is_empty()
            && let Some(zone) = first_non_empty([Some(overrides.zone.as_str()), env(ZONE_ENV)])
        {
            self.zone = zone;
        }
    }

    /// Check required settings, and return warnings for suspicious ones.
    pub fn validate(&self) -> Result<Vec<String>, Error> {
        let mut missing = Vec::new();
        if self.token.is_empty() {
            missing.push("sacloud_token");
        }
        if self.secret.is_empty() {
            missing.push("sacloud_token_secret");
        }
        if self.zone.is_empty() {
            missing.push("sacloud_zone");
        }
        if !missing.is_empty() {
            return Err(Error::Missing(missing));
        }

        let mut warnings = Vec::new();
        if self.targets.is_empty() {
            warnings.push("no targets configured, generated file will be empty".to_string());
        }
        for (index, rule) in self.targets.iter().enumerate() {
            if rule.ports.is_empty() {
                warnings.push(format!(
                    "target {index} ({:?}) has no ports, it generates nothing",
                    rule.service
                ));
            }
            if let Some(tag) = self
                .base_tags
                .iter()
                .chain(&rule.tags)
                .find(|tag| rule.ignore_tags.contains(tag))
            {
                warnings.push(format!(
                    "target {index} ({:?}) requires and ignores tag {tag:?}, it generates nothing",
                    rule.service
                ));
            }
        }

        Ok(warnings)
    }
}
