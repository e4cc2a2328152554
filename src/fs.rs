//! Read-only filesystem access used by the resolver, the lister and the
//! file-serving branch.
//!
//! Everything goes through [`FileSystem`] so that the root-containment check
//! can be exercised against an in-memory tree.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The subset of file metadata the server looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub is_dir: bool,
    pub is_file: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

pub trait FileSystem: Send + Sync {
    /// Resolves `.`, `..` and symlinks. Fails if any component is missing.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Metadata of `path`, following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Paths of the immediate children of `path`, in no particular order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl FileSystem for DiskFs {
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        let meta = std::fs::metadata(path)?;
        Ok(Metadata {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(path)? {
            match entry {
                Ok(entry) => children.push(entry.path()),
                Err(e) => tracing::debug!(dir = %path.display(), error = %e, "Skipping unreadable entry"),
            }
        }
        Ok(children)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
