//! Scoped temporary PDF files
//!
//! Every file handed out by [`TempStore`] is deleted when its [`TempPdf`]
//! handle is dropped, whichever way the owning operation returns.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;

#[derive(Debug, Clone)]
pub struct TempStore {
    dir: PathBuf,
}

impl TempStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform temp directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty, uniquely named `<prefix>*.pdf` file.
    pub fn create(&self, prefix: &str) -> io::Result<TempPdf> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".pdf")
            .tempfile_in(&self.dir)?;
        Ok(TempPdf {
            path: file.into_temp_path(),
        })
    }

    /// Create a file holding `bytes`.
    pub fn write(&self, prefix: &str, bytes: &[u8]) -> io::Result<TempPdf> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".pdf")
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(TempPdf {
            path: file.into_temp_path(),
        })
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::system()
    }
}

/// Owned handle to a temp file. The file is closed; only the path is kept.
#[derive(Debug)]
pub struct TempPdf {
    path: TempPath,
}

impl TempPdf {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path());

        let file = store.write("input", b"%PDF-1.7 test").unwrap();
        assert_eq!(file.read().unwrap(), b"%PDF-1.7 test");
        assert!(file.path().starts_with(dir.path()));
    }

    #[test]
    fn test_names_are_unique_and_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path());

        let a = store.create("output").unwrap();
        let b = store.create("output").unwrap();
        assert_ne!(a.path(), b.path());

        let name = a.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("output"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path());

        let file = store.write("input", b"data").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path().join("does-not-exist"));
        assert!(store.create("output").is_err());
    }
}
