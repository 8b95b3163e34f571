use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use models::restaurant;
use crate::errors::ServiceError;
use crate::restaurant::{DocumentStore, NewRestaurant, Reservation, Restaurant};

/// SeaORM-backed document store: one `restaurant` row per document, the
/// reservation sequence embedded in a jsonb column.
pub struct SeaOrmDocumentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_domain(m: restaurant::Model) -> Result<Restaurant, ServiceError> {
    let id = m.id;
    let reservations: Vec<Reservation> = serde_json::from_value(m.reservations)
        .map_err(|e| ServiceError::Persistence(format!("restaurant {} has malformed reservations: {}", id, e)))?;
    Ok(Restaurant { id, name: m.name, description: m.description, reservations, version: m.version })
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    async fn insert(&self, doc: NewRestaurant) -> Result<Restaurant, ServiceError> {
        let created = restaurant::create(&self.db, &doc.name, &doc.description).await?;
        to_domain(created)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
        restaurant::find(&self.db, id).await?.map(to_domain).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Restaurant>, ServiceError> {
        restaurant::list(&self.db).await?.into_iter().map(to_domain).collect()
    }

    async fn replace_reservations(
        &self,
        id: Uuid,
        reservations: &[Reservation],
        expected_version: i64,
    ) -> Result<bool, ServiceError> {
        let json = serde_json::to_value(reservations).map_err(ServiceError::persistence)?;
        Ok(restaurant::replace_reservations(&self.db, id, json, expected_version).await?)
    }

    async fn close(&self) -> Result<(), ServiceError> {
        self.db.clone().close().await.map_err(ServiceError::persistence)?;
        info!("database pool closed");
        Ok(())
    }
}
