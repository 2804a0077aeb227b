//! Catalog and configuration errors. Fatal for a run: nothing is dispatched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A non-blank line did not split into exactly `<name> <url>`.
    #[error("line {line}: expected `<name> <url>`, found {found} token(s)")]
    Malformed { line: usize, found: usize },

    #[error("line {line}: entry name is empty")]
    EmptyName { line: usize },

    /// Name cannot be used as a single directory under the destination root.
    #[error("line {line}: invalid entry name {name:?}")]
    InvalidName { line: usize, name: String },

    #[error("line {line}: duplicate entry name {name:?} (first defined on line {first})")]
    DuplicateName {
        line: usize,
        name: String,
        first: usize,
    },

    #[error("line {line}: invalid source URL {url:?}: {reason}")]
    InvalidUrl {
        line: usize,
        url: String,
        reason: String,
    },

    #[error("unknown catalog entry {0:?}")]
    UnknownName(String),

    #[error("read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
