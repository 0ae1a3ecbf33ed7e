use std::collections::BTreeMap;

use discovery::{TargetGroup, sanitize_label_name};

use super::address::resolve_address;
use crate::config::{HostnameMode, TargetRule};
use crate::sacloud::Server;

/// Source of every target group built from Sakura Cloud
pub const SOURCE: &str = "sacloud";

pub const SACLOUD_LABEL_ZONE: &str = "__meta_sacloud_zone";
pub const SACLOUD_LABEL_RESOURCE_ID: &str = "__meta_sacloud_resource_id";
pub const SACLOUD_LABEL_NAME: &str = "__meta_sacloud_name";
pub const SACLOUD_LABEL_IP: &str = "__meta_sacloud_ip";
pub const SACLOUD_LABEL_TAGS: &str = "__meta_sacloud_instances_tags";

const HOSTNAME_LABEL: &str = "hostname";
const SERVICE_LABEL: &str = "service";

/// Sanitized tags wrapped with commas, e.g. `,web,prod_1,`, so a relabel
/// regex like `.*,web,.*` never matches a partial tag. `None` if the server
/// has no tags.
pub fn tags_label(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        return None;
    }

    let mut label = String::from(",");
    for tag in tags {
        label.push_str(&sanitize_label_name(tag));
        label.push(',');
    }

    Some(label)
}

/// Build the target group of one server. `None` if no address could be
/// resolved or the rule has no ports, the server is not monitored then.
pub fn build(server: &Server, rule: &TargetRule, mode: HostnameMode) -> Option<TargetGroup> {
    if rule.ports.is_empty() {
        return None;
    }

    let Some(address) = resolve_address(server, rule.interface_index) else {
        debug!(
            message = "no address found, skip server",
            id = server.id,
            name = %server.name,
            interface_index = rule.interface_index
        );

        return None;
    };

    let targets = rule
        .ports
        .iter()
        .map(|port| format!("{address}:{port}"))
        .collect();

    let mut labels = BTreeMap::from([
        (SACLOUD_LABEL_ZONE.to_string(), server.zone.name.clone()),
        (SACLOUD_LABEL_RESOURCE_ID.to_string(), server.id.to_string()),
        (SACLOUD_LABEL_NAME.to_string(), server.name.clone()),
        (SACLOUD_LABEL_IP.to_string(), address.to_string()),
    ]);

    if let Some(tags) = tags_label(&server.tags) {
        labels.insert(SACLOUD_LABEL_TAGS.to_string(), tags);
    }

    let hostname = match mode {
        HostnameMode::HostName => &server.host_name,
        HostnameMode::Name => &server.name,
    };
    labels.insert(HOSTNAME_LABEL.to_string(), hostname.clone());
    labels.insert(SERVICE_LABEL.to_string(), rule.service.clone());

    Some(TargetGroup {
        targets,
        labels,
        source: SOURCE.to_string(),
    })
}

/// Build target groups for `servers`, in the same order.
pub fn build_all(servers: &[Server], rule: &TargetRule, mode: HostnameMode) -> Vec<TargetGroup> {
    servers
        .iter()
        .filter_map(|server| build(server, rule, mode))
        .collect()
}
