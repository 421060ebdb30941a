//! Per-user preferences repository.

use crate::error::MetadataResult;
use crate::models::PreferenceRow;
use async_trait::async_trait;

/// Repository for the `preferences` table.
#[async_trait]
pub trait PreferenceRepo: Send + Sync {
    /// Insert or update a preference row.
    async fn set_preference(&self, pref: &PreferenceRow) -> MetadataResult<()>;

    /// Read a single preference value.
    async fn get_preference(
        &self,
        userid: &str,
        appid: &str,
        configkey: &str,
    ) -> MetadataResult<Option<String>>;

    /// Count preference rows for a user.
    async fn count_preferences_for_user(&self, userid: &str) -> MetadataResult<u64>;

    /// Delete all preference rows for a user. Returns the number of rows
    /// removed.
    async fn delete_preferences_for_user(&self, userid: &str) -> MetadataResult<u64>;
}
