//! `amirror list` – show catalog entries and their archive URLs.

use amirror_core::archive_url::archive_url;
use amirror_core::config::MirrorConfig;
use anyhow::Result;
use std::path::Path;

use super::catalog::resolve_catalog;

pub fn run_list(cfg: &MirrorConfig, catalog: Option<&Path>) -> Result<()> {
    let catalog = resolve_catalog(cfg, catalog)?;
    if catalog.is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }
    println!("{:<24} {}", "NAME", "ARCHIVE");
    for entry in catalog.entries() {
        println!(
            "{:<24} {}",
            entry.name(),
            archive_url(entry.source_url(), &cfg.default_branch)
        );
    }
    Ok(())
}
