use crate::sacloud::Server;

/// Extract one address candidate, `None` if the candidate is missing or empty.
type Extractor = fn(&Server, usize) -> Option<&str>;

/// Address candidates, the first non-empty one is used.
const CANDIDATES: [Extractor; 3] = [
    // maybe a private address, the NIC is connected to a switch
    selected_user_ip_address,
    // maybe a shared global address
    primary_ip_address,
    // configured by the API
    primary_user_ip_address,
];

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

fn selected_user_ip_address(server: &Server, index: usize) -> Option<&str> {
    server
        .interfaces
        .get(index)
        .and_then(|nic| non_empty(&nic.user_ip_address))
}

fn primary_ip_address(server: &Server, _index: usize) -> Option<&str> {
    server
        .interfaces
        .first()
        .and_then(|nic| non_empty(&nic.ip_address))
}

fn primary_user_ip_address(server: &Server, _index: usize) -> Option<&str> {
    server
        .interfaces
        .first()
        .and_then(|nic| non_empty(&nic.user_ip_address))
}

/// Pick the address to scrape, `None` if the server doesn't have the
/// interface at `interface_index`, or no address is assigned at all.
pub fn resolve_address(server: &Server, interface_index: usize) -> Option<&str> {
    if server.interfaces.len() <= interface_index {
        return None;
    }

    CANDIDATES
        .iter()
        .find_map(|extract| extract(server, interface_index))
}
