//! Summaries of a run for the CLI: text lines and JSON records.

use crate::fetcher::{FetchOutcome, FetchResult, FetchStage};
use serde::Serialize;

/// One result flattened for display or serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<FetchStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

impl From<&FetchResult> for ResultRecord {
    fn from(r: &FetchResult) -> Self {
        match &r.outcome {
            FetchOutcome::Success(s) => Self {
                name: r.name.clone(),
                ok: true,
                stage: None,
                error: None,
                sha256: Some(s.sha256.clone()),
                bytes: Some(s.bytes),
            },
            FetchOutcome::Failed(e) => Self {
                name: r.name.clone(),
                ok: false,
                stage: Some(e.stage()),
                error: Some(e.to_string()),
                sha256: None,
                bytes: None,
            },
        }
    }
}

/// Results of a run sorted by name, split into successes and failures.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub records: Vec<ResultRecord>,
}

impl Report {
    pub fn from_results(results: &[FetchResult]) -> Self {
        let mut records: Vec<ResultRecord> = results.iter().map(ResultRecord::from).collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Self { records }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter().filter(|r| r.ok)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter().filter(|r| !r.ok)
    }

    pub fn any_failed(&self) -> bool {
        self.records.iter().any(|r| !r.ok)
    }

    /// `Updated <name>` per success.
    pub fn success_lines(&self) -> Vec<String> {
        self.succeeded().map(|r| format!("Updated {}", r.name)).collect()
    }

    /// `<name>: <stage> failed: <cause>` per failure.
    pub fn failure_lines(&self) -> Vec<String> {
        self.failed()
            .map(|r| {
                let stage = r.stage.unwrap_or(FetchStage::Internal);
                format!(
                    "{}: {} failed: {}",
                    r.name,
                    stage,
                    r.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}
