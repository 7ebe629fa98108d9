//! Directory listing capability consumed by the search
//!
//! The toolkit does not implement filesystem traversal; it only
//! coordinates it. Whatever actually yields child entries - a local
//! filesystem, a remote protocol, an in-memory fixture - plugs in
//! through `DirectoryLister`.

use crate::error::AccessResult;
use std::path::Path;

/// One child entry of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (no path separators)
    pub name: String,

    /// Whether this entry is itself a directory
    pub is_dir: bool,
}

impl DirEntry {
    /// A non-directory entry
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// A directory entry
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Capability to list the children of a directory
///
/// `list` fails with an [`AccessError`](crate::error::AccessError) for an
/// unreadable path; the search records the failure and keeps going.
pub trait DirectoryLister: Send + Sync {
    /// List the entries of `path`
    fn list(&self, path: &Path) -> AccessResult<Vec<DirEntry>>;
}

/// Any `Fn(&Path) -> AccessResult<Vec<DirEntry>>` is a lister
impl<F> DirectoryLister for F
where
    F: Fn(&Path) -> AccessResult<Vec<DirEntry>> + Send + Sync,
{
    fn list(&self, path: &Path) -> AccessResult<Vec<DirEntry>> {
        self(path)
    }
}
