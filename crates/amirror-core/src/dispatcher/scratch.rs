//! Run-scoped scratch directory, removed when the guard is dropped.

use std::io;
use std::path::Path;
use tempfile::TempDir;

const SCRATCH_PREFIX: &str = "amirror-";

/// Exclusively-owned temp dir for one dispatcher run. Removed by `close`
/// or, on any other exit path (early return, panic), by `Drop`.
pub struct ScratchRoot {
    dir: Option<TempDir>,
}

impl ScratchRoot {
    /// Creates a uniquely named directory under `parent` (system temp dir if None).
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match parent {
            Some(p) => builder.tempdir_in(p)?,
            None => builder.tempdir()?,
        };
        tracing::debug!(path = %dir.path().display(), "created scratch root");
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .map(|d| d.path())
            .unwrap_or_else(|| Path::new(""))
    }

    /// Removes the directory and reports any error.
    pub fn close(mut self) -> io::Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

impl Drop for ScratchRoot {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(path = %path.display(), "could not remove scratch root: {}", e);
            }
        }
    }
}
