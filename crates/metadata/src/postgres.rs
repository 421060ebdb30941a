//! PostgreSQL-based metadata store implementation.

use crate::error::MetadataResult;
use crate::models::{PreferenceRow, StorageRow};
use crate::repos::{FileCacheRepo, PreferenceRepo, StorageRepo};
use crate::store::{MetadataStore, entry_name};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::str::FromStr;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Create a new PostgreSQL store from individual connection parameters.
    ///
    /// This allows credentials to be passed separately, enabling better
    /// secret management (e.g., passwords via environment variables).
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Internal: Connect to PostgreSQL with the given options.
    async fn connect(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        // Set statement_timeout if configured to prevent hung queries.
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // PostgreSQL doesn't allow multiple statements in a single prepared
        // statement, so the schema is split and executed statement by
        // statement.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageRepo for PostgresStore {
    async fn create_storage(&self, id: &str) -> MetadataResult<i64> {
        let numeric_id: i64 = sqlx::query_scalar(
            "INSERT INTO storages (id, available) VALUES ($1, $2) RETURNING numeric_id",
        )
        .bind(id)
        .bind(true)
        .fetch_one(&self.pool)
        .await?;
        Ok(numeric_id)
    }

    async fn get_storage_by_id(&self, id: &str) -> MetadataResult<Option<StorageRow>> {
        let row = sqlx::query_as::<_, StorageRow>("SELECT * FROM storages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_storage(&self, numeric_id: i64) -> MetadataResult<u64> {
        let result = sqlx::query("DELETE FROM storages WHERE numeric_id = $1")
            .bind(numeric_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl FileCacheRepo for PostgresStore {
    async fn add_filecache_entry(
        &self,
        storage: i64,
        path: &str,
        size: i64,
        mtime: i64,
    ) -> MetadataResult<i64> {
        let fileid: i64 = sqlx::query_scalar(
            "INSERT INTO filecache (storage, path, name, size, mtime) \
             VALUES ($1, $2, $3, $4, $5) RETURNING fileid",
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
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM filecache WHERE storage = $1")
            .bind(storage)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn delete_filecache_for_storage(&self, storage: i64) -> MetadataResult<u64> {
        let result = sqlx::query("DELETE FROM filecache WHERE storage = $1")
            .bind(storage)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PreferenceRepo for PostgresStore {
    async fn set_preference(&self, pref: &PreferenceRow) -> MetadataResult<()> {
        sqlx::query(
            "INSERT INTO preferences (userid, appid, configkey, configvalue) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (userid, appid, configkey) \
             DO UPDATE SET configvalue = EXCLUDED.configvalue",
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
             WHERE userid = $1 AND appid = $2 AND configkey = $3",
        )
        .bind(userid)
        .bind(appid)
        .bind(configkey)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn count_preferences_for_user(&self, userid: &str) -> MetadataResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM preferences WHERE userid = $1")
            .bind(userid)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn delete_preferences_for_user(&self, userid: &str) -> MetadataResult<u64> {
        let result = sqlx::query("DELETE FROM preferences WHERE userid = $1")
            .bind(userid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_statements() {
        let statements = postgres_schema_statements(POSTGRES_SCHEMA);
        assert_eq!(statements.len(), 4);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS storages"));
        assert!(statements.iter().all(|s| !s.is_empty()));
    }
}
