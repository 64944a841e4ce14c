//! Core domain types and pipeline stages.

pub mod table;
pub mod schema;
pub mod universe;
pub mod fetcher;
pub mod merge;
pub mod filter;
pub mod score;
pub mod pipeline;
pub mod error;
