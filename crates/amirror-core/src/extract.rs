//! Zip extraction into a fresh directory and root-layout check.
//!
//! An archive must unpack to exactly one top-level directory; that
//! directory is what gets moved into the destination root.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("open archive {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Corrupt or truncated zip, or an entry whose path escapes the target.
    #[error("corrupt archive: {0}")]
    Corrupt(#[from] zip::result::ZipError),
    #[error("expected exactly one top-level directory, found {found:?}")]
    UnexpectedLayout { found: Vec<String> },
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Extracts `archive` into `target` (which must not exist yet) and returns
/// the path of the single top-level directory inside it.
pub fn extract_single_root(archive: &Path, target: &Path) -> Result<PathBuf, ExtractError> {
    let file = fs::File::open(archive).map_err(|source| ExtractError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file)?;

    fs::create_dir(target)?;
    zip.extract(target)?;

    single_root_dir(target)
}

/// Returns the only entry of `dir` if it is a directory; fails otherwise.
fn single_root_dir(dir: &Path) -> Result<PathBuf, ExtractError> {
    let mut found = Vec::new();
    let mut root = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            root = Some(entry.path());
        }
        found.push(entry.file_name().to_string_lossy().into_owned());
    }
    match (found.len(), root) {
        (1, Some(root)) => Ok(root),
        _ => {
            found.sort();
            Err(ExtractError::UnexpectedLayout { found })
        }
    }
}
