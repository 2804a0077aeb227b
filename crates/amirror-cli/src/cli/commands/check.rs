//! `amirror check` – validate a catalog.

use amirror_core::config::MirrorConfig;
use anyhow::Result;
use std::path::Path;

use super::catalog::resolve_catalog;

pub fn run_check(cfg: &MirrorConfig, catalog: Option<&Path>) -> Result<()> {
    let catalog = resolve_catalog(cfg, catalog)?;
    println!("catalog OK: {} entries", catalog.len());
    Ok(())
}
