use serde::{Deserialize, Deserializer};

/// Server is a snapshot of a Sakura Cloud server, only the fields needed to
/// build scrape targets are decoded.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Server {
    #[serde(rename = "ID", deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// The host name configured when the disk was modified, it could be
    /// different from `name`
    #[serde(default, deserialize_with = "nullable")]
    pub host_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub zone: Zone,
    #[serde(default, deserialize_with = "nullable")]
    pub interfaces: Vec<Interface>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
}

impl Server {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Zone {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

/// NIC of a server, empty string means the address is not assigned.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Interface {
    /// Assigned by Sakura Cloud when the NIC connects to the shared segment
    #[serde(rename = "IPAddress", default, deserialize_with = "nullable")]
    pub ip_address: String,
    /// Configured by the user, when the NIC connects to a switch
    #[serde(rename = "UserIPAddress", default, deserialize_with = "nullable")]
    pub user_ip_address: String,
}

/// Response of `GET /server`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct FindResponse {
    /// `None` if the API left it out, pages are fetched until an empty one then
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub from: usize,
    #[serde(default)]
    pub count: usize,
    #[serde(default, deserialize_with = "nullable")]
    pub servers: Vec<Server>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The API returns IDs as strings, numbers are accepted too.
fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        String(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(id) => Ok(id),
        Id::String(s) => s
            .parse::<u64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid id {s:?}, {err}"))),
    }
}
