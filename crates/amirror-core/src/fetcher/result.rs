//! Per-entry outcome of a fetch, tagged with the stage that failed.

use crate::download::DownloadError;
use crate::extract::ExtractError;
use crate::replace::ReplaceError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStage {
    Download,
    Extract,
    Replace,
    /// Unexpected fault outside the three stages (e.g. a panicking task).
    Internal,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStage::Download => "download",
            FetchStage::Extract => "extract",
            FetchStage::Replace => "replace",
            FetchStage::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Replace(#[from] ReplaceError),
    #[error("{0}")]
    Internal(String),
}

impl FetchError {
    pub fn stage(&self) -> FetchStage {
        match self {
            FetchError::Download(_) => FetchStage::Download,
            FetchError::Extract(_) => FetchStage::Extract,
            FetchError::Replace(_) => FetchStage::Replace,
            FetchError::Internal(_) => FetchStage::Internal,
        }
    }
}

/// What a successful fetch installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSuccess {
    pub archive_url: String,
    pub bytes: u64,
    pub sha256: String,
    pub destination: PathBuf,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Success(FetchSuccess),
    Failed(FetchError),
}

/// Result of one catalog entry, labelled by name (results arrive in completion order).
#[derive(Debug)]
pub struct FetchResult {
    pub name: String,
    pub outcome: FetchOutcome,
}

impl FetchResult {
    pub fn success(name: impl Into<String>, success: FetchSuccess) -> Self {
        Self {
            name: name.into(),
            outcome: FetchOutcome::Success(success),
        }
    }

    pub fn failed(name: impl Into<String>, error: FetchError) -> Self {
        Self {
            name: name.into(),
            outcome: FetchOutcome::Failed(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success(_))
    }

    /// Stage that failed, or None on success.
    pub fn failed_stage(&self) -> Option<FetchStage> {
        match &self.outcome {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failed(e) => Some(e.stage()),
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.outcome {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failed(e) => Some(e),
        }
    }
}
