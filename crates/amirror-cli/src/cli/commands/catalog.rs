//! Catalog and destination resolution shared by commands.

use amirror_core::catalog::Catalog;
use amirror_core::config::MirrorConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// `--catalog` wins, then `catalog_path` from config, then the built-in list.
pub fn resolve_catalog(cfg: &MirrorConfig, flag: Option<&Path>) -> Result<Catalog> {
    match flag.or(cfg.catalog_path.as_deref()) {
        Some(path) => {
            let catalog = Catalog::load_path(path)
                .with_context(|| format!("catalog {}", path.display()))?;
            tracing::debug!(path = %path.display(), entries = catalog.len(), "loaded catalog");
            Ok(catalog)
        }
        None => Ok(Catalog::builtin()),
    }
}

/// `--dest` wins, then `destination_dir` from config, then `./bundle`.
pub fn resolve_destination(cfg: &MirrorConfig, flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag.or_else(|| cfg.destination_dir.clone()) {
        return Ok(dir);
    }
    Ok(std::env::current_dir()?.join("bundle"))
}
