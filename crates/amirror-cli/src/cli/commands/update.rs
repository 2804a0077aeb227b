//! `amirror update` – fetch the catalog and swap each archive into place.

use amirror_core::config::MirrorConfig;
use amirror_core::dispatcher::Dispatcher;
use amirror_core::report::Report;
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::catalog::{resolve_catalog, resolve_destination};

#[derive(Debug, Default)]
pub struct UpdateOptions {
    pub jobs: Option<usize>,
    pub dest: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub only: Vec<String>,
    pub branch: Option<String>,
    pub json: bool,
}

/// Returns true if every entry was updated.
pub async fn run_update(cfg: &MirrorConfig, opts: UpdateOptions) -> Result<bool> {
    let catalog = resolve_catalog(cfg, opts.catalog.as_deref())?.select(&opts.only)?;
    if catalog.is_empty() {
        println!("Catalog is empty.");
        return Ok(true);
    }

    let mut cfg = cfg.clone();
    if let Some(branch) = opts.branch {
        cfg.default_branch = branch;
    }
    let jobs = opts.jobs.unwrap_or(cfg.max_concurrent);
    let dest = resolve_destination(&cfg, opts.dest)?;

    let results = Dispatcher::from_config(&cfg)
        .run(catalog, jobs, &dest)
        .await
        .context("dispatch")?;
    let report = Report::from_results(&results);

    if opts.json {
        println!("{}", report.to_json()?);
    } else {
        for line in report.success_lines() {
            println!("{}", line);
        }
        for line in report.failure_lines() {
            eprintln!("{}", line);
        }
    }

    if report.any_failed() {
        tracing::warn!(
            failed = report.failed().count(),
            "update finished with failures"
        );
    } else {
        tracing::info!(updated = report.records.len(), "update finished");
    }
    Ok(!report.any_failed())
}
