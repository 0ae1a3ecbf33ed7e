//! Sakura Cloud server inventory.

mod client;
mod server;

pub use client::{Client, DEFAULT_API_ROOT_URL, Error};
pub use server::{Interface, Server, Zone};

/// Inventory lists servers of a zone.
#[async_trait::async_trait]
pub trait Inventory: Send + Sync {
    /// Find all servers in `zone` which have every tag in `tags`, an empty
    /// `tags` matches all servers. Servers are returned in the order the
    /// inventory lists them.
    async fn find_servers(&self, zone: &str, tags: &[String]) -> Result<Vec<Server>, Error>;
}
