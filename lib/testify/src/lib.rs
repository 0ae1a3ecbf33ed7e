pub mod http;
pub mod temp;
