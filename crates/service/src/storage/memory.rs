use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::restaurant::{DocumentStore, NewRestaurant, Reservation, Restaurant};

/// Process-local document store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<Vec<Restaurant>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, doc: NewRestaurant) -> Result<Restaurant, ServiceError> {
        let created = Restaurant::new(doc);
        self.docs.write().await.push(created.clone());
        Ok(created)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| d.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Restaurant>, ServiceError> {
        Ok(self.docs.read().await.clone())
    }

    async fn replace_reservations(
        &self,
        id: Uuid,
        reservations: &[Reservation],
        expected_version: i64,
    ) -> Result<bool, ServiceError> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) if doc.version == expected_version => {
                doc.reservations = reservations.to_vec();
                doc.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
