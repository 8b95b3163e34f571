use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewRestaurant, Reservation, Restaurant};
use crate::errors::ServiceError;

/// Document-store abstraction holding restaurant documents.
///
/// "Absent" is `Ok(None)`/`Ok(false)`, never an error; `Err` always means the
/// backend itself failed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new restaurant and return it with its assigned id.
    async fn insert(&self, doc: NewRestaurant) -> Result<Restaurant, ServiceError>;

    async fn find_one(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError>;

    /// Every restaurant, in creation order.
    async fn find_all(&self) -> Result<Vec<Restaurant>, ServiceError>;

    /// Atomically overwrite the reservation sequence of one document if its
    /// version still equals `expected_version`, bumping the version.
    /// Returns `false` when the document is gone or was written meanwhile.
    async fn replace_reservations(
        &self,
        id: Uuid,
        reservations: &[Reservation],
        expected_version: i64,
    ) -> Result<bool, ServiceError>;

    /// Release backend resources at shutdown.
    async fn close(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
