//! User-files abstraction and backends for scour.
//!
//! This crate provides:
//! - The File/Folder node model for a user's hierarchical file tree
//! - The `FileStore` trait the purge orchestrator drives
//! - A local filesystem backend rooted at the platform's data directory

pub mod backends;
pub mod error;
pub mod node;
pub mod traits;

pub use backends::filesystem::FilesystemTree;
pub use error::{FilesError, FilesResult};
pub use node::FileNode;
pub use traits::FileStore;

use scour_core::config::FilesConfig;
use std::sync::Arc;

/// Create a file store from configuration.
pub async fn from_config(config: &FilesConfig) -> FilesResult<Arc<dyn FileStore>> {
    match config {
        FilesConfig::Filesystem { path } => {
            let backend = FilesystemTree::new(path).await?;
            Ok(Arc::new(backend))
        }
    }
}
