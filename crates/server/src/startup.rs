use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, StorageBackend};
use dotenvy::dotenv;
use migration::MigratorTrait;
use service::{
    restaurant::{DocumentStore, ReservationStore},
    storage::{JsonFileStore, MemoryDocumentStore, SeaOrmDocumentStore},
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the document store selected by `[storage] backend`.
pub async fn build_store(cfg: &AppConfig) -> Result<Arc<dyn DocumentStore>, StartupError> {
    match cfg.storage.backend {
        StorageBackend::Memory => {
            info!(backend = "memory", "document store ready; data is not persisted");
            let store: Arc<dyn DocumentStore> = MemoryDocumentStore::new();
            Ok(store)
        }
        StorageBackend::File => {
            let store: Arc<dyn DocumentStore> = JsonFileStore::new(&cfg.storage.data_file)
                .await
                .map_err(|e| StartupError::Storage(e.to_string()))?;
            Ok(store)
        }
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            migration::Migrator::up(&db, None)
                .await
                .map_err(|e| StartupError::Storage(format!("migrations failed: {e}")))?;
            info!(backend = "postgres", "document store ready; migrations applied");
            let store: Arc<dyn DocumentStore> = Arc::new(SeaOrmDocumentStore::new(db));
            Ok(store)
        }
    }
}

/// Router over an explicitly constructed store.
pub fn build_app(reservations: ReservationStore) -> Router {
    routes::build_router(ServerState::new(reservations), build_cors())
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, draining connections");
}

/// Public entry: load config, open the store, serve until Ctrl+C, close the store.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let addr = bind_addr(&cfg)?;

    let reservations = ReservationStore::new(build_store(&cfg).await?);
    let state = ServerState::new(reservations);
    let app = routes::build_router(state.clone(), build_cors());

    info!(%addr, backend = ?cfg.storage.backend, "starting reservation server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    state.reservations.close().await?;
    info!("document store closed");
    Ok(())
}
