//! Storage-accounting repository.

use crate::error::MetadataResult;
use crate::models::StorageRow;
use async_trait::async_trait;

/// Repository for the `storages` table.
#[async_trait]
pub trait StorageRepo: Send + Sync {
    /// Register a storage key, returning the database-assigned numeric id.
    async fn create_storage(&self, id: &str) -> MetadataResult<i64>;

    /// Look up a storage-accounting row by its string key
    /// (e.g. `home::alice`).
    async fn get_storage_by_id(&self, id: &str) -> MetadataResult<Option<StorageRow>>;

    /// Delete the storage row. Returns the number of rows removed.
    async fn delete_storage(&self, numeric_id: i64) -> MetadataResult<u64>;
}
