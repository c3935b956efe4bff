//! RAII guard for intermediate files the pipeline creates
//!
//! Scratch files (the normalized PNG handed to the compressor, the
//! block-compressed file it produces) must be deleted on every exit path,
//! including error paths. Unlike `tempfile::NamedTempFile`, a [`ScratchFile`]
//! owns a path the caller chose directly (next to the sidecar, or wherever
//! the collaborator layer wants it to land for inspection) rather than a
//! path in the OS temp directory.

use std::path::{Path, PathBuf};

/// Owns a path and deletes the file there when dropped.
///
/// Construction does not create the file; the caller writes to
/// [`ScratchFile::path`] and the guard takes care of cleanup regardless of
/// how the enclosing function returns.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create a guard for `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this guard will delete on drop
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove scratch file");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.png");
        std::fs::write(&path, b"fake png bytes").unwrap();
        assert!(path.exists());

        {
            let guard = ScratchFile::new(&path);
            assert_eq!(guard.path(), path);
        }

        assert!(!path.exists());
    }

    #[test]
    fn drop_is_a_no_op_if_file_never_materialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.png");
        let guard = ScratchFile::new(&path);
        drop(guard);
        assert!(!path.exists());
    }
}
