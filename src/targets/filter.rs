use crate::sacloud::Server;

/// Drop servers which have any of the tags in `exclude`, the order of the
/// remaining servers is preserved.
///
/// Required tags are not checked here, the inventory query already applies
/// them and its result is trusted as is.
pub fn filter(servers: Vec<Server>, exclude: &[String]) -> Vec<Server> {
    servers
        .into_iter()
        .filter(|server| !exclude.iter().any(|tag| server.has_tag(tag)))
        .collect()
}
