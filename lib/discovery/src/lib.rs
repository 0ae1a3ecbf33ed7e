//! Prometheus file based service discovery.
//!
//! A discovery file is a YAML (or JSON) list of target groups, each one is a
//! list of `host:port` targets sharing a common label set.
//!
//! ```yaml
//! - targets:
//!   - 10.0.0.1:9100
//!   labels:
//!     __meta_sacloud_zone: is1a
//!     service: node
//! ```

mod file;

#[macro_use]
extern crate tracing;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use file::{Error, read, write};

/// Labels start with this prefix are dropped by Prometheus after relabeling,
/// so discovery implementations use it for their private metadata.
pub const META_LABEL_PREFIX: &str = "__meta_";

/// TargetGroup is a set of targets with a common label set
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TargetGroup {
    /// `targets` is a list of `host:port` addresses, all of them share the
    /// same `labels`
    pub targets: Vec<String>,

    /// `labels` is a set of labels that is common across all targets in the group
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// An identifier that describes a group of targets, it is not part of
    /// the file format.
    #[serde(skip)]
    pub source: String,
}

/// Replace every character which is not allowed in a label name with `_`.
///
/// Valid characters are `[a-zA-Z0-9_]`, each invalid character is replaced
/// by exactly one underscore, so the result has the same number of chars
/// as the input. Sanitizing a sanitized string returns it unchanged.
pub fn sanitize_label_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
