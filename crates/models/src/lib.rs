//! sea-orm entities and connection helpers for the Postgres storage backend.

pub mod errors;
pub mod db;
pub mod restaurant;

#[cfg(test)]
mod tests;
