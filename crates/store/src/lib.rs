//! Result store implementations for SatScout.

pub mod catalog;
pub mod file_backend;
pub mod in_memory;

pub use catalog::Catalog;
pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;

use satscout_config::AppConfig;
use satscout_core::error::StoreError;
use satscout_core::store::ResultStore;
use std::sync::Arc;

/// Open the store backend named in the configuration.
pub async fn open_from_config(config: &AppConfig) -> Result<Arc<dyn ResultStore>, StoreError> {
    match config.store.backend.as_str() {
        "in_memory" => Ok(Arc::new(InMemoryStore::new())),
        _ => Ok(Arc::new(FileStore::open(config.store_path()).await?)),
    }
}
