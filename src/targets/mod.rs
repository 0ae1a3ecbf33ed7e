//! Turn Sakura Cloud servers into Prometheus target groups.
//!
//! For every target rule, servers are narrowed by [`filter`] and each
//! eligible server becomes at most one target group by [`build`].

mod address;
mod builder;
mod filter;

pub use address::resolve_address;
pub use builder::{
    SACLOUD_LABEL_IP, SACLOUD_LABEL_NAME, SACLOUD_LABEL_RESOURCE_ID, SACLOUD_LABEL_TAGS,
    SACLOUD_LABEL_ZONE, SOURCE, build, build_all, tags_label,
};
pub use filter::filter;
