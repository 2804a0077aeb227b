//! Dispatcher: run the fetcher over a catalog, bounded-parallel.
//!
//! One scratch root per run, created before any entry starts and removed
//! after the last one finishes, whatever the mix of outcomes. Every entry
//! yields exactly one `FetchResult`; failures never cancel siblings.

mod pool;
mod scratch;

pub use pool::run_bounded;
pub use scratch::ScratchRoot;

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::MirrorConfig;
use crate::fetcher::{FetchError, FetchResult, Fetcher};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Nothing was dispatched.
    #[error("create scratch root: {0}")]
    Scratch(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    fetcher: Fetcher,
    scratch_parent: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            scratch_parent: None,
        }
    }

    pub fn from_config(cfg: &MirrorConfig) -> Self {
        Self {
            fetcher: Fetcher::from_config(cfg),
            scratch_parent: cfg.scratch_parent.clone(),
        }
    }

    /// Create scratch roots under `parent` instead of the system temp dir.
    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }

    /// Fetches every catalog entry into `destination_root/<name>` with at most
    /// `concurrency_limit` entries in flight. Results are in completion order.
    pub async fn run(
        &self,
        catalog: Catalog,
        concurrency_limit: usize,
        destination_root: &Path,
    ) -> Result<Vec<FetchResult>, DispatchError> {
        let fetcher = self.fetcher.clone();
        self.run_with(
            catalog,
            concurrency_limit,
            destination_root,
            move |entry: &CatalogEntry, scratch: &Path, dest: &Path| {
                fetcher.fetch(entry, scratch, dest)
            },
        )
        .await
    }

    /// Same as `run` with `fetch` standing in for the fetcher.
    async fn run_with<F>(
        &self,
        catalog: Catalog,
        concurrency_limit: usize,
        destination_root: &Path,
        fetch: F,
    ) -> Result<Vec<FetchResult>, DispatchError>
    where
        F: Fn(&CatalogEntry, &Path, &Path) -> FetchResult + Send + Sync + 'static,
    {
        let scratch = ScratchRoot::create(self.scratch_parent.as_deref())?;
        tracing::info!(
            entries = catalog.len(),
            limit = concurrency_limit,
            dest = %destination_root.display(),
            "dispatching"
        );

        let names: Vec<String> = catalog
            .entries()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        let scratch_path = scratch.path().to_path_buf();
        let dest = destination_root.to_path_buf();

        let outcomes = run_bounded(
            catalog.into_iter().collect::<Vec<_>>(),
            concurrency_limit,
            move |entry: CatalogEntry| fetch(&entry, &scratch_path, &dest),
        )
        .await;

        let results: Vec<FetchResult> = outcomes
            .into_iter()
            .map(|(index, outcome)| match outcome {
                Ok(result) => result,
                Err(msg) => {
                    let name = names.get(index).cloned().unwrap_or_default();
                    tracing::error!(name = %name, "{}", msg);
                    FetchResult::failed(name, FetchError::Internal(msg))
                }
            })
            .collect();

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!(path = %scratch_path.display(), "could not remove scratch root: {}", e);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(ok = results.len() - failed, failed, "dispatch finished");
        Ok(results)
    }
}
