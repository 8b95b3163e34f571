//! Service layer for restaurant documents and their embedded reservations.
//! - Separates reservation lifecycle rules from storage backends.
//! - Storage backends implement one `DocumentStore` trait.
//! - Errors surface as `ServiceError` for the HTTP layer to map.

pub mod errors;
pub mod restaurant;
pub mod storage;
#[cfg(test)]
pub mod test_support;
