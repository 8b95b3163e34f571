use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::restaurant::{DocumentStore, NewRestaurant, Reservation, Restaurant};

/// JSON file-backed document store.
///
/// Persists the restaurant array to one JSON file. Each write builds the next
/// state on a copy, writes it to a temp file, renames it into place and only
/// then publishes it in memory, so a failed write changes nothing.
pub struct JsonFileStore {
    inner: RwLock<Vec<Restaurant>>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Initialize the store from a path. Creates the file with an empty array if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::persistence)?;
            }
        }

        let docs: Vec<Restaurant> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Persistence(format!("corrupt data file {}: {}", file_path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty: Vec<Restaurant> = Vec::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(ServiceError::persistence)?)
                    .await
                    .map_err(ServiceError::persistence)?;
                empty
            }
            Err(e) => return Err(ServiceError::persistence(e)),
        };

        info!(path = %file_path.display(), restaurants = docs.len(), "json file store loaded");
        Ok(Arc::new(Self { inner: RwLock::new(docs), file_path }))
    }

    async fn save(&self, docs: &[Restaurant]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(docs).map_err(ServiceError::persistence)?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(ServiceError::persistence)?;
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::persistence(e));
        }
        debug!(path = %self.file_path.display(), restaurants = docs.len(), "json file store saved");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn insert(&self, doc: NewRestaurant) -> Result<Restaurant, ServiceError> {
        let created = Restaurant::new(doc);
        let mut docs = self.inner.write().await;
        let mut next = docs.clone();
        next.push(created.clone());
        self.save(&next).await?;
        *docs = next;
        Ok(created)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
        let docs = self.inner.read().await;
        Ok(docs.iter().find(|d| d.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Restaurant>, ServiceError> {
        Ok(self.inner.read().await.clone())
    }

    async fn replace_reservations(
        &self,
        id: Uuid,
        reservations: &[Reservation],
        expected_version: i64,
    ) -> Result<bool, ServiceError> {
        let mut docs = self.inner.write().await;
        let Some(pos) = docs.iter().position(|d| d.id == id && d.version == expected_version) else {
            return Ok(false);
        };
        let mut next = docs.clone();
        next[pos].reservations = reservations.to_vec();
        next[pos].version += 1;
        self.save(&next).await?;
        *docs = next;
        Ok(true)
    }
}
