//! Application state shared by every session.

use std::sync::Arc;

use crate::api::{ApiError, BlockflowClient};
use crate::config::StorefrontConfig;
use crate::storage::{FileStore, KeyValueStore};

/// Process-wide resources: configuration, the API client and the durable
/// slots.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    client: BlockflowClient,
    storage: Arc<dyn KeyValueStore>,
}

impl AppState {
    /// Create state backed by a [`FileStore`] in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Create state over caller-supplied slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ApiError> {
        let client = BlockflowClient::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                storage,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the BlockFlow API client.
    #[must_use]
    pub fn client(&self) -> &BlockflowClient {
        &self.inner.client
    }

    /// Get a handle to the durable slots.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.inner.storage)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("client", &self.inner.client)
            .finish_non_exhaustive()
    }
}
