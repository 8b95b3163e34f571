use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Reserved for input checks; the reservation store does not raise it today.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    /// The conditional write kept losing to concurrent writers.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn persistence(e: impl std::fmt::Display) -> Self { Self::Persistence(e.to_string()) }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self { Self::persistence(e) }
}
