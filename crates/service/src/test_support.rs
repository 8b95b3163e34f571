#![cfg(test)]
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::restaurant::{DocumentStore, NewRestaurant, Reservation, Restaurant};
use crate::storage::MemoryDocumentStore;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_db_config() -> configs::DatabaseConfig {
    configs::DatabaseConfig {
        url: models::db::DATABASE_URL.clone(),
        min_connections: 1,
        connect_timeout_secs: 3,
        acquire_timeout_secs: 10,
        ..Default::default()
    }
}

/// Fresh migrated connection, or `None` when Postgres is unavailable or `SKIP_DB_TESTS` is set.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&test_db_config()).await else {
                eprintln!("skip: cannot connect to db");
                return false;
            };
            let ok = migration::Migrator::up(&db, None).await.is_ok();
            drop(db);
            ok
        })
        .await;
    if !migrated {
        return Ok(None);
    }
    Ok(Some(connect_with_config(&test_db_config()).await?))
}

/// Unique temp path for file-backed store tests.
pub fn scratch_file(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}.json", prefix, Uuid::new_v4()))
}

/// Memory store with injectable faults: failing writes, and writers that
/// sneak in between a caller's read and its conditional write.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: Arc<MemoryDocumentStore>,
    pub fail_writes: AtomicBool,
    pub races_to_lose: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst); }

    pub fn lose_races(&self, n: usize) { self.races_to_lose.store(n, Ordering::SeqCst); }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn insert(&self, doc: NewRestaurant) -> Result<Restaurant, ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::Persistence("injected write failure".into()));
        }
        self.inner.insert(doc).await
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
        self.inner.find_one(id).await
    }

    async fn find_all(&self) -> Result<Vec<Restaurant>, ServiceError> {
        self.inner.find_all().await
    }

    async fn replace_reservations(
        &self,
        id: Uuid,
        reservations: &[Reservation],
        expected_version: i64,
    ) -> Result<bool, ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::Persistence("injected write failure".into()));
        }
        let lose = self
            .races_to_lose
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lose {
            // a concurrent writer rewrites the document unchanged, bumping its version
            if let Some(current) = self.inner.find_one(id).await? {
                self.inner.replace_reservations(id, &current.reservations, current.version).await?;
            }
        }
        self.inner.replace_reservations(id, reservations, expected_version).await
    }
}
