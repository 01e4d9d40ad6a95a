use std::sync::Arc;

use crate::admin::AdminStore;
use crate::catalog::{FileTypeClassifier, ResourceCatalog};
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::qr::QrCache;
use crate::storage::Storage;

/// The shared application state.
///
/// Cloned into every handler by axum. Apart from the database itself and the
/// QR cache nothing in here is mutable.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Read-only link/set queries.
    pub catalog: ResourceCatalog,
    /// File storage backend shared by the catalog and the admin store.
    pub storage: Arc<dyn Storage>,
    /// Rendered QR codes.
    pub qr_cache: QrCache,
    /// The application metrics.
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig, storage: Arc<dyn Storage>) -> Self {
        let catalog = ResourceCatalog::new(
            db.clone(),
            storage.clone(),
            FileTypeClassifier::from_table(&config.file_types),
        );
        let qr_cache = QrCache::new(config.qr.cache_capacity);

        Self {
            db,
            config: Arc::new(config),
            catalog,
            storage,
            qr_cache,
            metrics: Metrics::new(),
        }
    }

    /// Write-service over the same database and storage. Not used by any route.
    pub fn admin(&self) -> AdminStore {
        AdminStore::new(self.db.clone(), self.storage.clone())
    }
}
