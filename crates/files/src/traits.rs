//! File store trait definition.

use crate::error::FilesResult;
use crate::node::FileNode;
use async_trait::async_trait;

/// Hierarchical file storage abstraction.
///
/// Backends own the nodes; callers hold [`FileNode`] handles and request
/// operations through this trait. The only structural guarantee a backend
/// must provide is that the tree under any folder is finite and acyclic.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// Resolve the home folder for a user, creating it if absent.
    async fn user_folder(&self, uid: &str) -> FilesResult<FileNode>;

    /// Resolve the parent container of a node.
    ///
    /// Fails with [`FilesError::NoParent`](crate::FilesError::NoParent) for
    /// nodes directly under the tree root.
    async fn parent(&self, node: &FileNode) -> FilesResult<FileNode>;

    /// List the children of a folder. Order is unspecified.
    async fn list(&self, folder: &FileNode) -> FilesResult<Vec<FileNode>>;

    /// Delete a single node.
    ///
    /// Files are unlinked; folders must be empty. Backends distinguish
    /// `PermissionDenied`, `NotEmpty` and `NotFound` from other failures so
    /// callers can apply per-node tolerance policies.
    async fn delete(&self, node: &FileNode) -> FilesResult<()>;

    /// Verify backend availability.
    async fn health_check(&self) -> FilesResult<()> {
        Ok(())
    }
}
