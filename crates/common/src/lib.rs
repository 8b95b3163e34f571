//! Shared building blocks for the reservation service crates.

pub mod types;
pub mod utils;
