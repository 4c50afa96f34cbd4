use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::errors::MetaError;

/// Filesystem scan that lists files with a given extension under a root.
pub struct FileScan {
    root: PathBuf,
    extension: String,
}

impl FileScan {
    /// Create a scan rooted at `root` that keeps files ending in `.{extension}`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// All matching files, recursively, in lexicographic path order.
    pub fn list(&self) -> Result<Vec<PathBuf>, MetaError> {
        if !self.root.is_dir() {
            return Err(MetaError::Storage {
                path: self.root.clone(),
                reason: "corpus root is not a directory".into(),
            });
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|err| MetaError::Storage {
                path: self.root.clone(),
                reason: err.to_string(),
            })?;
            if entry.file_type().is_file() && has_extension(entry.path(), &self.extension) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// True if the path has the given extension (case-insensitive).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Write `bytes` to `path` so the file is either complete or absent.
///
/// Data goes to a temporary file in the destination directory first and is
/// renamed into place once fully flushed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MetaError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| MetaError::Storage {
        path: path.to_path_buf(),
        reason: err.error.to_string(),
    })?;
    Ok(())
}

/// Create `dir` when missing and verify it can be listed.
pub fn ensure_readable_dir(dir: &Path) -> Result<(), MetaError> {
    fs::create_dir_all(dir).map_err(|err| MetaError::Storage {
        path: dir.to_path_buf(),
        reason: format!("cannot create folder: {err}"),
    })?;
    fs::read_dir(dir).map_err(|err| MetaError::Storage {
        path: dir.to_path_buf(),
        reason: format!("folder is not readable: {err}"),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scan_lists_matching_files_recursively_in_path_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        for name in ["b.bin", "a.bin", "notes.txt", "nested/c.BIN"] {
            fs::write(root.join(name), b"x").unwrap();
        }

        let files = FileScan::new(root, "bin").list().unwrap();
        let names: Vec<PathBuf> = files
            .iter()
            .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.bin"),
                PathBuf::from("b.bin"),
                PathBuf::from("nested/c.BIN")
            ]
        );
    }

    #[test]
    fn scan_rejects_missing_root() {
        let temp = tempdir().unwrap();
        let err = FileScan::new(temp.path().join("absent"), "bin")
            .list()
            .unwrap_err();
        assert!(matches!(err, MetaError::Storage { .. }));
    }

    #[test]
    fn atomic_write_replaces_content_and_creates_parents() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("deep/out.bin");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn ensure_readable_dir_creates_missing_folders() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("meta");
        ensure_readable_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
