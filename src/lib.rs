pub mod config;
pub mod generate;
pub mod sacloud;
pub mod schedule;
pub mod signal;
pub mod targets;
pub mod trace;

#[macro_use]
extern crate tracing;

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
