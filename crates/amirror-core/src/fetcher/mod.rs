//! Fetcher: one catalog entry → download, extract, replace.
//!
//! Each entry works in its own `<scratch>/<name>/` directory, so entries
//! running concurrently never collide. No retries; the first failing stage
//! ends the entry and is reported in its `FetchResult`.

mod result;

pub use result::{FetchError, FetchOutcome, FetchResult, FetchStage, FetchSuccess};

use crate::archive_url::{archive_url, expected_root_dir};
use crate::catalog::CatalogEntry;
use crate::config::{HttpConfig, MirrorConfig};
use crate::download::{download_archive, DownloadError};
use crate::extract::extract_single_root;
use crate::replace::replace_tree;
use std::fs;
use std::path::Path;

const ARCHIVE_FILE: &str = "archive.zip";
const EXTRACT_DIR: &str = "extract";

#[derive(Debug, Clone)]
pub struct Fetcher {
    http: HttpConfig,
    branch: String,
}

impl Fetcher {
    pub fn new(http: HttpConfig, branch: impl Into<String>) -> Self {
        Self {
            http,
            branch: branch.into(),
        }
    }

    pub fn from_config(cfg: &MirrorConfig) -> Self {
        Self::new(cfg.http.clone(), cfg.default_branch.clone())
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Runs all three stages for `entry`. Never fails past this boundary:
    /// errors are returned inside the `FetchResult`.
    pub fn fetch(
        &self,
        entry: &CatalogEntry,
        scratch_root: &Path,
        destination_root: &Path,
    ) -> FetchResult {
        let work = scratch_root.join(entry.name());
        let result = match self.try_fetch(entry, &work, destination_root) {
            Ok(success) => {
                tracing::info!(
                    name = entry.name(),
                    bytes = success.bytes,
                    sha256 = %success.sha256,
                    "updated {}",
                    success.destination.display()
                );
                FetchResult::success(entry.name(), success)
            }
            Err(e) => {
                match &e {
                    FetchError::Replace(r) if r.destination_lost() => {
                        tracing::error!(name = entry.name(), "replace failed: {}", e)
                    }
                    _ => tracing::warn!(name = entry.name(), stage = %e.stage(), "{}", e),
                }
                FetchResult::failed(entry.name(), e)
            }
        };

        if let Err(e) = fs::remove_dir_all(&work) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %work.display(), "could not clear entry scratch: {}", e);
            }
        }
        result
    }

    fn try_fetch(
        &self,
        entry: &CatalogEntry,
        work: &Path,
        destination_root: &Path,
    ) -> Result<FetchSuccess, FetchError> {
        fs::create_dir_all(work).map_err(DownloadError::Io)?;

        let url = archive_url(entry.source_url(), &self.branch);
        let archive = work.join(ARCHIVE_FILE);
        tracing::debug!(name = entry.name(), url = %url, "downloading");
        let downloaded = download_archive(&url, &archive, &self.http)?;

        tracing::debug!(name = entry.name(), bytes = downloaded.bytes, "extracting");
        let root = extract_single_root(&archive, &work.join(EXTRACT_DIR))?;
        let expected = expected_root_dir(entry.name(), &self.branch);
        if root.file_name().map(|n| n != expected.as_str()).unwrap_or(true) {
            tracing::debug!(
                name = entry.name(),
                root = %root.display(),
                "archive root is not {}; using it anyway",
                expected
            );
        }

        let destination = replace_tree(&root, destination_root, entry.name())?;

        Ok(FetchSuccess {
            archive_url: url.to_string(),
            bytes: downloaded.bytes,
            sha256: downloaded.sha256,
            destination,
        })
    }
}
