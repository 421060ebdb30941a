//! Database models mapping to the platform schema.

use sqlx::FromRow;

/// Storage-accounting record for a user's primary storage.
///
/// The string `id` carries the well-known `home::<uid>` key; `numeric_id`
/// is assigned by the database and referenced from `filecache.storage`.
#[derive(Debug, Clone, FromRow)]
pub struct StorageRow {
    pub numeric_id: i64,
    pub id: String,
    pub available: bool,
}

/// Cached file metadata row pointing into a storage.
#[derive(Debug, Clone, FromRow)]
pub struct FileCacheRow {
    pub fileid: i64,
    pub storage: i64,
    pub path: String,
    pub name: String,
    pub size: i64,
    pub mtime: i64,
}

/// Per-user setting row.
#[derive(Debug, Clone, FromRow)]
pub struct PreferenceRow {
    pub userid: String,
    pub appid: String,
    pub configkey: String,
    pub configvalue: String,
}
