//! Maps request paths onto the server root.
//!
//! The resolver is the server's only guard against path traversal: a target
//! whose canonical path is not inside the canonical root is reported as
//! missing, and nothing beyond canonicalization touches it.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::ServerError;
use crate::fs::FileSystem;

/// Where a request path landed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Canonical path, or the joined path when canonicalization failed
    pub canonical_path: PathBuf,
    pub exists_on_disk: bool,
    pub is_directory: bool,
    pub within_root: bool,
    pub last_modified: Option<SystemTime>,
}

impl ResolvedTarget {
    fn missing(path: PathBuf, within_root: bool) -> Self {
        Self {
            canonical_path: path,
            exists_on_disk: false,
            is_directory: false,
            within_root,
            last_modified: None,
        }
    }
}

#[derive(Clone)]
pub struct PathResolver {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl PathResolver {
    /// Canonicalizes `root` once. Fails if it does not exist or is not a directory.
    pub fn new(fs: Arc<dyn FileSystem>, root: &Path) -> Result<Self, ServerError> {
        let invalid = |source| ServerError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        };

        let canonical = fs.canonicalize(root).map_err(invalid)?;
        let meta = fs.metadata(&canonical).map_err(invalid)?;
        if !meta.is_dir {
            return Err(invalid(io::Error::other("not a directory")));
        }

        Ok(Self { fs, root: canonical })
    }

    /// The canonical server root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn resolve(&self, decoded_path: &str) -> ResolvedTarget {
        let joined = self.root.join(decoded_path.trim_start_matches('/'));

        let canonical = match self.fs.canonicalize(&joined) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(path = %joined.display(), error = %e, "Target does not resolve");
                let within_root = normalize(&joined).starts_with(&self.root);
                return ResolvedTarget::missing(joined, within_root);
            }
        };

        // Path::starts_with compares whole components, so /srv2 is not under /srv.
        if !canonical.starts_with(&self.root) {
            let err = ServerError::PathTraversalRejected { path: canonical.clone() };
            tracing::warn!(requested = %decoded_path, "{err}");
            return ResolvedTarget::missing(canonical, false);
        }

        match self.fs.metadata(&canonical) {
            // FIFOs, sockets and devices are not served; reading one can block forever.
            Ok(meta) if !meta.is_dir && !meta.is_file => {
                tracing::debug!(path = %canonical.display(), "Target is not a regular file or directory");
                ResolvedTarget::missing(canonical, true)
            }
            Ok(meta) => ResolvedTarget {
                canonical_path: canonical,
                exists_on_disk: true,
                is_directory: meta.is_dir,
                within_root: true,
                last_modified: meta.modified,
            },
            Err(e) => {
                tracing::debug!(path = %canonical.display(), error = %e, "Target metadata unavailable");
                ResolvedTarget::missing(canonical, true)
            }
        }
    }
}

/// Lexical `.`/`..` removal, used only to classify targets that do not exist.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryFs;

    fn resolver(fs: MemoryFs) -> PathResolver {
        PathResolver::new(Arc::new(fs), Path::new("/srv")).unwrap()
    }

    fn tree() -> MemoryFs {
        MemoryFs::new()
            .file("/srv/a.txt", b"hello")
            .dir("/srv/sub")
            .file("/srv2/secret.txt", b"nope")
            .file("/etc/passwd", b"root:x:0:0")
    }

    #[test]
    fn resolves_file_inside_root() {
        let target = resolver(tree()).resolve("/a.txt");

        assert!(target.exists_on_disk);
        assert!(target.within_root);
        assert!(!target.is_directory);
        assert_eq!(target.canonical_path, PathBuf::from("/srv/a.txt"));
    }

    #[test]
    fn root_request_is_a_directory() {
        let r = resolver(tree());
        let target = r.resolve("/");

        assert!(target.is_directory);
        assert_eq!(target.canonical_path, r.root());
    }

    #[test]
    fn dot_dot_escape_is_reported_missing() {
        let target = resolver(tree()).resolve("/../../etc/passwd");

        assert!(!target.exists_on_disk);
        assert!(!target.within_root);
    }

    #[test]
    fn sibling_with_common_prefix_is_outside() {
        let target = resolver(tree()).resolve("/../srv2/secret.txt");

        assert!(!target.exists_on_disk);
        assert!(!target.within_root);
    }

    #[test]
    fn symlink_out_of_root_is_rejected() {
        let fs = tree().symlink("/srv/etc", "/etc");
        let target = resolver(fs).resolve("/etc/passwd");

        assert!(!target.exists_on_disk);
        assert!(!target.within_root);
        assert_eq!(target.canonical_path, PathBuf::from("/etc/passwd"));
    }

    #[test]
    fn symlink_within_root_is_followed() {
        let fs = tree().symlink("/srv/alias", "sub");
        let target = resolver(fs).resolve("/alias");

        assert!(target.exists_on_disk);
        assert!(target.is_directory);
        assert_eq!(target.canonical_path, PathBuf::from("/srv/sub"));
    }

    #[test]
    fn missing_target_stays_classified_by_location() {
        let r = resolver(tree());

        let inside = r.resolve("/missing");
        assert!(!inside.exists_on_disk);
        assert!(inside.within_root);

        let outside = r.resolve("/../missing");
        assert!(!outside.exists_on_disk);
        assert!(!outside.within_root);
    }

    #[test]
    fn special_files_are_reported_missing() {
        let fs = tree().fifo("/srv/pipe");
        let target = resolver(fs).resolve("/pipe");

        assert!(!target.exists_on_disk);
        assert!(target.within_root);
    }

    #[test]
    fn root_must_be_a_directory() {
        let fs = Arc::new(tree());
        let result = PathResolver::new(fs, Path::new("/srv/a.txt"));

        assert!(matches!(result, Err(ServerError::InvalidRoot { .. })));
    }
}
