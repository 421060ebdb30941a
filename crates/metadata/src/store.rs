//! Metadata store trait and the SQLite implementation.

use crate::error::MetadataResult;
use crate::repos::{FileCacheRepo, PreferenceRepo, StorageRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: StorageRepo + FileCacheRepo + PreferenceRepo + Send + Sync {
    /// Create the schema if it does not exist yet.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// Derive the cached `name` column from a file path.
pub(crate) fn entry_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection
            // avoids "database is locked" failures under axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Implement the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::{PreferenceRow, StorageRow};

    #[async_trait]
    impl StorageRepo for SqliteStore {
        async fn create_storage(&self, id: &str) -> MetadataResult<i64> {
            let numeric_id: i64 = sqlx::query_scalar(
                "INSERT INTO storages (id, available) VALUES (?, ?) RETURNING numeric_id",
            )
            .bind(id)
            .bind(true)
            .fetch_one(&self.pool)
            .await?;
            Ok(numeric_id)
        }

        async fn get_storage_by_id(&self, id: &str) -> MetadataResult<Option<StorageRow>> {
            let row = sqlx::query_as::<_, StorageRow>("SELECT * FROM storages WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn delete_storage(&self, numeric_id: i64) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM storages WHERE numeric_id = ?")
                .bind(numeric_id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }
    }

    #[async_trait]
    impl FileCacheRepo for SqliteStore {
        async fn add_filecache_entry(
            &self,
            storage: i64,
            path: &str,
            size: i64,
            mtime: i64,
        ) -> MetadataResult<i64> {
            let fileid: i64 = sqlx::query_scalar(
                "INSERT INTO filecache (storage, path, name, size, mtime) \
                 VALUES (?, ?, ?, ?, ?) RETURNING fileid",
            )
            .bind(storage)
            .bind(path)
            .bind(entry_name(path))
            .bind(size)
            .bind(mtime)
            .fetch_one(&self.pool)
            .await?;
            Ok(fileid)
        }

        async fn count_filecache_for_storage(&self, storage: i64) -> MetadataResult<u64> {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM filecache WHERE storage = ?")
                    .bind(storage)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count as u64)
        }

        async fn delete_filecache_for_storage(&self, storage: i64) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM filecache WHERE storage = ?")
                .bind(storage)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }
    }

    #[async_trait]
    impl PreferenceRepo for SqliteStore {
        async fn set_preference(&self, pref: &PreferenceRow) -> MetadataResult<()> {
            sqlx::query(
                "INSERT INTO preferences (userid, appid, configkey, configvalue) \
                 VALUES (?, ?, ?, ?) \
                 ON CONFLICT (userid, appid, configkey) \
                 DO UPDATE SET configvalue = excluded.configvalue",
            )
            .bind(&pref.userid)
            .bind(&pref.appid)
            .bind(&pref.configkey)
            .bind(&pref.configvalue)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_preference(
            &self,
            userid: &str,
            appid: &str,
            configkey: &str,
        ) -> MetadataResult<Option<String>> {
            let value: Option<String> = sqlx::query_scalar(
                "SELECT configvalue FROM preferences \
                 WHERE userid = ? AND appid = ? AND configkey = ?",
            )
            .bind(userid)
            .bind(appid)
            .bind(configkey)
            .fetch_optional(&self.pool)
            .await?;
            Ok(value)
        }

        async fn count_preferences_for_user(&self, userid: &str) -> MetadataResult<u64> {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM preferences WHERE userid = ?")
                    .bind(userid)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count as u64)
        }

        async fn delete_preferences_for_user(&self, userid: &str) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM preferences WHERE userid = ?")
                .bind(userid)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }
    }
}

/// SQLite schema (embedded). Mirrors the platform tables the purge touches,
/// for standalone and test deployments where the platform schema is not
/// already present.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS storages (
    numeric_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    available INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS filecache (
    fileid INTEGER PRIMARY KEY AUTOINCREMENT,
    storage INTEGER NOT NULL,
    path TEXT NOT NULL,
    name TEXT NOT NULL,
    size INTEGER NOT NULL DEFAULT 0,
    mtime INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_filecache_storage ON filecache (storage);

CREATE TABLE IF NOT EXISTS preferences (
    userid TEXT NOT NULL,
    appid TEXT NOT NULL,
    configkey TEXT NOT NULL,
    configvalue TEXT,
    PRIMARY KEY (userid, appid, configkey)
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PreferenceRow;
    use scour_core::home_storage_id;
    use tempfile::tempdir;

    async fn store() -> (tempfile::TempDir, SqliteStore) {
        let temp = tempdir().unwrap();
        let store = SqliteStore::new(temp.path().join("metadata.db"))
            .await
            .unwrap();
        (temp, store)
    }

    #[test]
    fn entry_name_is_last_component() {
        assert_eq!(entry_name("files/docs/report.txt"), "report.txt");
        assert_eq!(entry_name("report.txt"), "report.txt");
    }

    #[tokio::test]
    async fn storage_lookup_matches_exact_key() {
        let (_temp, store) = store().await;

        let alice = store.create_storage(&home_storage_id("alice")).await.unwrap();
        let alice2 = store
            .create_storage(&home_storage_id("alice2"))
            .await
            .unwrap();
        assert_ne!(alice, alice2);

        let row = store
            .get_storage_by_id("home::alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.numeric_id, alice);
        assert_eq!(row.id, "home::alice");
        assert!(row.available);

        assert!(
            store
                .get_storage_by_id("home::nobody")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_storage_only_removes_target() {
        let (_temp, store) = store().await;

        let alice = store.create_storage("home::alice").await.unwrap();
        store.create_storage("home::alice2").await.unwrap();

        assert_eq!(store.delete_storage(alice).await.unwrap(), 1);
        assert_eq!(store.delete_storage(alice).await.unwrap(), 0);
        assert!(
            store
                .get_storage_by_id("home::alice2")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn filecache_deletes_are_scoped_by_storage() {
        let (_temp, store) = store().await;

        let alice = store.create_storage("home::alice").await.unwrap();
        let bob = store.create_storage("home::bob").await.unwrap();

        store
            .add_filecache_entry(alice, "files/a.txt", 3, 1700000000)
            .await
            .unwrap();
        store
            .add_filecache_entry(alice, "files/docs/b.txt", 5, 1700000001)
            .await
            .unwrap();
        store
            .add_filecache_entry(bob, "files/c.txt", 7, 1700000002)
            .await
            .unwrap();

        assert_eq!(store.count_filecache_for_storage(alice).await.unwrap(), 2);
        assert_eq!(store.delete_filecache_for_storage(alice).await.unwrap(), 2);
        assert_eq!(store.count_filecache_for_storage(alice).await.unwrap(), 0);
        assert_eq!(store.count_filecache_for_storage(bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn preferences_upsert_and_scoped_delete() {
        let (_temp, store) = store().await;

        let pref = PreferenceRow {
            userid: "alice".to_string(),
            appid: "core".to_string(),
            configkey: "lang".to_string(),
            configvalue: "en".to_string(),
        };
        store.set_preference(&pref).await.unwrap();
        store
            .set_preference(&PreferenceRow {
                configvalue: "de".to_string(),
                ..pref.clone()
            })
            .await
            .unwrap();
        store
            .set_preference(&PreferenceRow {
                userid: "alice2".to_string(),
                ..pref.clone()
            })
            .await
            .unwrap();

        assert_eq!(
            store
                .get_preference("alice", "core", "lang")
                .await
                .unwrap()
                .as_deref(),
            Some("de")
        );
        assert_eq!(store.count_preferences_for_user("alice").await.unwrap(), 1);

        assert_eq!(store.delete_preferences_for_user("alice").await.unwrap(), 1);
        assert_eq!(store.count_preferences_for_user("alice").await.unwrap(), 0);
        assert_eq!(store.count_preferences_for_user("alice2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn health_check_ok() {
        let (_temp, store) = store().await;
        store.health_check().await.unwrap();
    }
}
