//! Application state shared across handlers.

use crate::auth::normalize_token_hash;
use scour_core::config::AppConfig;
use scour_files::FileStore;
use scour_metadata::MetadataStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Files tree backend.
    pub files: Arc<dyn FileStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Normalized admin token hash (lowercase hex).
    pub admin_token_hash: Arc<str>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if the configured admin token hash is malformed. Failing fast
    /// here keeps a server with an unusable admin gate from starting.
    pub fn new(
        config: AppConfig,
        files: Arc<dyn FileStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let admin_token_hash = match normalize_token_hash(&config.admin.token_hash) {
            Ok(hash) => hash,
            Err(error) => panic!("Invalid admin configuration: {}", error),
        };

        Self {
            config: Arc::new(config),
            files,
            metadata,
            admin_token_hash: admin_token_hash.into(),
        }
    }
}
