//! Port traits implemented by the adapters.

pub mod cache_port;
pub mod config_port;
pub mod market_port;
pub mod result_port;
