//! Concrete adapter implementations for ports.

pub mod csv_store;
pub mod eastmoney;
pub mod file_config_adapter;
