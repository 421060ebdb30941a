//! Local filesystem file tree backend.

use crate::error::{FilesError, FilesResult};
use crate::node::FileNode;
use crate::traits::FileStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// Name of the per-user folder that holds the user's own files. Siblings of
/// this folder under the user root are platform metadata nodes (cache,
/// versions, trash).
const USER_FILES_DIR: &str = "files";

/// File tree rooted at the platform's data directory.
///
/// Layout: `<root>/<uid>` is a user's root container, `<root>/<uid>/files`
/// the user's home folder. Node keys are root-relative paths.
pub struct FilesystemTree {
    root: PathBuf,
}

impl FilesystemTree {
    /// Create a new filesystem tree backend.
    pub async fn new(root: impl AsRef<Path>) -> FilesResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Get the full path for a key, rejecting anything that could step
    /// outside the data root.
    fn key_path(&self, key: &str) -> FilesResult<PathBuf> {
        if key.is_empty() {
            return Err(FilesError::InvalidKey("empty".to_string()));
        }
        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(FilesError::InvalidKey(format!(
                "path traversal not allowed: {key}"
            )));
        }
        for component in Path::new(key).components() {
            match component {
                std::path::Component::Normal(_) => {}
                _ => {
                    return Err(FilesError::InvalidKey(format!(
                        "contains unsafe path component: {key}"
                    )));
                }
            }
        }
        Ok(self.root.join(key))
    }
}

/// Map a delete failure to the typed taxonomy callers filter on.
fn map_delete_err(e: std::io::Error, key: &str) -> FilesError {
    match e.kind() {
        std::io::ErrorKind::NotFound => FilesError::NotFound(key.to_string()),
        std::io::ErrorKind::PermissionDenied => FilesError::PermissionDenied(key.to_string()),
        std::io::ErrorKind::DirectoryNotEmpty => FilesError::NotEmpty(key.to_string()),
        _ => FilesError::Io(e),
    }
}

#[async_trait]
impl FileStore for FilesystemTree {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn user_folder(&self, uid: &str) -> FilesResult<FileNode> {
        scour_core::validate_uid(uid).map_err(|e| FilesError::InvalidKey(e.to_string()))?;

        let key = format!("{uid}/{USER_FILES_DIR}");
        let path = self.key_path(&key)?;
        fs::create_dir_all(&path).await?;
        Ok(FileNode::Folder { key })
    }

    #[instrument(skip(self, node), fields(backend = "filesystem", key = %node.key()))]
    async fn parent(&self, node: &FileNode) -> FilesResult<FileNode> {
        match node.key().rsplit_once('/') {
            Some((parent, _)) => Ok(FileNode::Folder {
                key: parent.to_string(),
            }),
            None => Err(FilesError::NoParent(node.key().to_string())),
        }
    }

    #[instrument(skip(self, folder), fields(backend = "filesystem", key = %folder.key()))]
    async fn list(&self, folder: &FileNode) -> FilesResult<Vec<FileNode>> {
        let key = match folder {
            FileNode::Folder { key } => key,
            FileNode::File { key } => return Err(FilesError::NotAFolder(key.clone())),
        };
        let path = self.key_path(key)?;

        let mut entries = fs::read_dir(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FilesError::NotFound(key.clone())
            } else {
                FilesError::Io(e)
            }
        })?;

        let mut nodes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().into_string().map_err(|_| {
                FilesError::InvalidKey(format!("non-UTF-8 file name under {key}"))
            })?;
            let child_key = format!("{key}/{name}");
            // file_type does not follow symlinks, so a symlinked directory
            // shows up as a File and gets unlinked rather than traversed.
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                nodes.push(FileNode::Folder { key: child_key });
            } else {
                nodes.push(FileNode::File { key: child_key });
            }
        }
        Ok(nodes)
    }

    #[instrument(skip(self, node), fields(backend = "filesystem", key = %node.key()))]
    async fn delete(&self, node: &FileNode) -> FilesResult<()> {
        let path = self.key_path(node.key())?;
        let result = match node {
            FileNode::File { .. } => fs::remove_file(&path).await,
            FileNode::Folder { .. } => fs::remove_dir(&path).await,
        };
        result.map_err(|e| map_delete_err(e, node.key()))
    }

    async fn health_check(&self) -> FilesResult<()> {
        let meta = fs::metadata(&self.root).await?;
        if !meta.is_dir() {
            return Err(FilesError::Config(format!(
                "files root is not a directory: {}",
                self.root.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn tree() -> (tempfile::TempDir, FilesystemTree) {
        let temp = tempdir().unwrap();
        let tree = FilesystemTree::new(temp.path()).await.unwrap();
        (temp, tree)
    }

    #[tokio::test]
    async fn user_folder_creates_home() {
        let (temp, tree) = tree().await;

        let home = tree.user_folder("alice").await.unwrap();
        assert_eq!(home.key(), "alice/files");
        assert!(temp.path().join("alice/files").is_dir());
    }

    #[tokio::test]
    async fn user_folder_rejects_traversal() {
        let (_temp, tree) = tree().await;

        for uid in ["..", "a/b", "", "a\\b"] {
            assert!(tree.user_folder(uid).await.is_err(), "accepted {uid:?}");
        }
    }

    #[tokio::test]
    async fn parent_of_home_is_user_root() {
        let (_temp, tree) = tree().await;

        let home = tree.user_folder("alice").await.unwrap();
        let root = tree.parent(&home).await.unwrap();
        assert_eq!(root.key(), "alice");

        match tree.parent(&root).await {
            Err(FilesError::NoParent(key)) => assert_eq!(key, "alice"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_distinguishes_files_and_folders() {
        let (temp, tree) = tree().await;

        let home = tree.user_folder("alice").await.unwrap();
        std::fs::write(temp.path().join("alice/files/a.txt"), b"a").unwrap();
        std::fs::create_dir(temp.path().join("alice/files/docs")).unwrap();

        let mut nodes = tree.list(&home).await.unwrap();
        nodes.sort_by(|a, b| a.key().cmp(b.key()));

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].key(), "alice/files/a.txt");
        assert!(!nodes[0].is_folder());
        assert_eq!(nodes[1].key(), "alice/files/docs");
        assert!(nodes[1].is_folder());
    }

    #[tokio::test]
    async fn list_rejects_file_node() {
        let (_temp, tree) = tree().await;

        let node = FileNode::File {
            key: "alice/files/a.txt".to_string(),
        };
        match tree.list(&node).await {
            Err(FilesError::NotAFolder(_)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_file_and_empty_folder() {
        let (temp, tree) = tree().await;

        tree.user_folder("alice").await.unwrap();
        std::fs::write(temp.path().join("alice/files/a.txt"), b"a").unwrap();

        tree.delete(&FileNode::File {
            key: "alice/files/a.txt".to_string(),
        })
        .await
        .unwrap();
        assert!(!temp.path().join("alice/files/a.txt").exists());

        tree.delete(&FileNode::Folder {
            key: "alice/files".to_string(),
        })
        .await
        .unwrap();
        assert!(!temp.path().join("alice/files").exists());
    }

    #[tokio::test]
    async fn delete_missing_node_is_not_found() {
        let (_temp, tree) = tree().await;

        let result = tree
            .delete(&FileNode::File {
                key: "alice/files/ghost".to_string(),
            })
            .await;
        match result {
            Err(FilesError::NotFound(key)) => assert_eq!(key, "alice/files/ghost"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_nonempty_folder_is_not_empty() {
        let (temp, tree) = tree().await;

        tree.user_folder("alice").await.unwrap();
        std::fs::write(temp.path().join("alice/files/a.txt"), b"a").unwrap();

        let result = tree
            .delete(&FileNode::Folder {
                key: "alice/files".to_string(),
            })
            .await;
        match result {
            Err(FilesError::NotEmpty(key)) => assert_eq!(key, "alice/files"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn delete_in_readonly_folder_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let (temp, tree) = tree().await;

        tree.user_folder("alice").await.unwrap();
        let locked = temp.path().join("alice/files/locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("pinned.txt"), b"x").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        let result = tree
            .delete(&FileNode::File {
                key: "alice/files/locked/pinned.txt".to_string(),
            })
            .await;

        // Restore so TempDir cleanup works.
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(FilesError::PermissionDenied(key)) => {
                assert_eq!(key, "alice/files/locked/pinned.txt")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
