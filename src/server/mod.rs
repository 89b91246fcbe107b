pub mod config;

use std::sync::Arc;
use tracing::info;

use crate::db::services::{DatabaseStore, LocalStore};
use crate::library::{LibraryError, LibraryService};
use config::{ServerConfig, StorageKind};

/// Builds the library on the backend selected in the configuration.
pub async fn build_library(config: &ServerConfig) -> Result<LibraryService, LibraryError> {
    match config.storage {
        StorageKind::Local => {
            info!(data_dir = %config.data_dir, "Using local store.");
            let store = LocalStore::open(&config.data_dir).await?;
            Ok(LibraryService::from_store(Arc::new(store)))
        }
        StorageKind::Database => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| LibraryError::validation("DATABASE_URL is not set"))?;
            info!("Using database store.");
            let store = DatabaseStore::connect(url).await?;
            Ok(LibraryService::from_store(Arc::new(store)))
        }
    }
}
