//! File tree node model.

/// A node in a user's file tree.
///
/// Each case carries an opaque backend key (a root-relative path for the
/// filesystem backend). A node is a handle, not the data: all operations on
/// it go through the owning [`FileStore`](crate::FileStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileNode {
    /// A regular file (or anything deletable by unlink, e.g. a symlink).
    File { key: String },
    /// A folder containing child nodes.
    Folder { key: String },
}

impl FileNode {
    /// The backend key of this node.
    pub fn key(&self) -> &str {
        match self {
            Self::File { key } | Self::Folder { key } => key,
        }
    }

    /// Whether this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// The node's own name (last key component).
    pub fn name(&self) -> &str {
        self.key().rsplit('/').next().unwrap_or_default()
    }
}

impl std::fmt::Display for FileNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { key } => write!(f, "file:{key}"),
            Self::Folder { key } => write!(f, "folder:{key}"),
        }
    }
}
