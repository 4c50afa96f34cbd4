//! Key-to-folder storage service used by meta-collection runs.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::errors::MetaError;
use crate::transport::fs::ensure_readable_dir;

/// Requested access to a storage folder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    /// Existing folder, contents are only read.
    ReadOnly,
    /// Folder the caller writes into.
    ReadWrite,
}

/// Resolves storage keys to folders.
pub trait StorageService {
    /// Folder for `key`, created when missing so imports always resolve.
    fn folder(&self, key: &str, mode: AccessMode) -> Result<PathBuf, MetaError>;
}

/// Filesystem storage that maps `key` to `<root>/<key>`.
#[derive(Clone, Debug)]
pub struct FsStorageService {
    root: PathBuf,
}

impl FsStorageService {
    /// Storage rooted at `root`; folders are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Folder every storage key lives under.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl StorageService for FsStorageService {
    fn folder(&self, key: &str, mode: AccessMode) -> Result<PathBuf, MetaError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(MetaError::Storage {
                path: self.root.clone(),
                reason: format!("invalid storage key '{key}'"),
            });
        }
        let folder = self.root.join(key);
        ensure_readable_dir(&folder)?;
        if mode == AccessMode::ReadWrite {
            let permissions = fs::metadata(&folder)?.permissions();
            if permissions.readonly() {
                return Err(MetaError::Storage {
                    path: folder,
                    reason: "folder is read-only".into(),
                });
            }
        }
        debug!(key, ?mode, folder = %folder.display(), "resolved storage folder");
        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::storage::{INPUT_KEY, META_KEY};
    use tempfile::tempdir;

    #[test]
    fn folders_are_created_under_the_root() {
        let temp = tempdir().unwrap();
        let storage = FsStorageService::new(temp.path());
        let meta = storage.folder(META_KEY, AccessMode::ReadOnly).unwrap();
        assert_eq!(meta, temp.path().join(META_KEY));
        assert!(meta.is_dir());
        let input = storage.folder(INPUT_KEY, AccessMode::ReadWrite).unwrap();
        assert!(input.is_dir());
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let temp = tempdir().unwrap();
        let storage = FsStorageService::new(temp.path());
        for key in ["", "..", "a/b"] {
            assert!(matches!(
                storage.folder(key, AccessMode::ReadOnly),
                Err(MetaError::Storage { .. })
            ));
        }
    }
}
