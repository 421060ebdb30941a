//! Server test utilities.

use scour_core::config::{AdminConfig, AppConfig, FilesConfig, MetadataConfig, ServerConfig};
use scour_core::home_storage_id;
use scour_files::{FileStore, FilesystemTree};
use scour_metadata::models::PreferenceRow;
use scour_metadata::{MetadataStore, SqliteStore};
use scour_server::{AppState, create_router};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Raw admin token matching `AdminConfig::for_testing()`.
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with a temporary files tree and SQLite store.
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        scour_server::metrics::register_metrics();

        // Create files tree
        let files_path = temp_dir.path().join("files");
        let files: Arc<dyn FileStore> = Arc::new(
            FilesystemTree::new(&files_path)
                .await
                .expect("Failed to create files backend"),
        );

        // Create metadata
        let db_path = temp_dir.path().join("metadata.db");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );

        let config = AppConfig {
            server: ServerConfig::default(),
            files: FilesConfig::Filesystem {
                path: files_path.clone(),
            },
            metadata: MetadataConfig::Sqlite { path: db_path },
            admin: AdminConfig::for_testing(),
        };

        let state = AppState::new(config, files, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata store.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Root of the on-disk files tree.
    pub fn files_root(&self) -> PathBuf {
        self._temp_dir.path().join("files")
    }

    /// Seed a user the way the platform would leave one behind: a storage
    /// row, a home folder with files, a sibling metadata folder under the
    /// user root, matching filecache rows, and a couple of preferences.
    /// Returns the storage's numeric id.
    pub async fn seed_user(&self, uid: &str) -> i64 {
        let metadata = self.metadata();
        let numeric_id = metadata
            .create_storage(&home_storage_id(uid))
            .await
            .expect("Failed to create storage row");

        let user_root = self.files_root().join(uid);
        std::fs::create_dir_all(user_root.join("files/docs")).expect("Failed to create home");
        std::fs::write(user_root.join("files/notes.txt"), b"notes").unwrap();
        std::fs::write(user_root.join("files/docs/report.txt"), b"report").unwrap();
        std::fs::create_dir_all(user_root.join("cache")).unwrap();
        std::fs::write(user_root.join("cache/thumb.png"), b"png").unwrap();

        for (path, size) in [("files/notes.txt", 5), ("files/docs/report.txt", 6)] {
            metadata
                .add_filecache_entry(numeric_id, path, size, 1700000000)
                .await
                .expect("Failed to add filecache entry");
        }

        for (key, value) in [("lang", "en"), ("timezone", "Europe/Berlin")] {
            metadata
                .set_preference(&PreferenceRow {
                    userid: uid.to_string(),
                    appid: "core".to_string(),
                    configkey: key.to_string(),
                    configvalue: value.to_string(),
                })
                .await
                .expect("Failed to set preference");
        }

        numeric_id
    }
}
