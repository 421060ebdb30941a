//! File-index cache repository.

use crate::error::MetadataResult;
use async_trait::async_trait;

/// Repository for the `filecache` table.
#[async_trait]
pub trait FileCacheRepo: Send + Sync {
    /// Insert a cache entry for a file within a storage, returning the
    /// assigned file id. The entry's `name` is derived from the last path
    /// component.
    async fn add_filecache_entry(
        &self,
        storage: i64,
        path: &str,
        size: i64,
        mtime: i64,
    ) -> MetadataResult<i64>;

    /// Count cache entries referencing a storage.
    async fn count_filecache_for_storage(&self, storage: i64) -> MetadataResult<u64>;

    /// Delete all cache entries referencing a storage. Returns the number of
    /// rows removed.
    async fn delete_filecache_for_storage(&self, storage: i64) -> MetadataResult<u64>;
}
