//! Line parser for catalog text: `<name> <sourceURL>` per line.

use super::error::ConfigError;

/// One non-blank, non-comment catalog line split into its two tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawLine<'a> {
    /// 1-based line number in the source text.
    pub line: usize,
    pub name: &'a str,
    pub url: &'a str,
}

/// Splits catalog text into lines of exactly two whitespace-separated tokens.
/// Blank lines and `#` comment lines are skipped.
pub(super) fn parse_lines(text: &str) -> Result<Vec<RawLine<'_>>, ConfigError> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match tokens.as_slice() {
            [name, url] => out.push(RawLine {
                line: idx + 1,
                name,
                url,
            }),
            other => {
                return Err(ConfigError::Malformed {
                    line: idx + 1,
                    found: other.len(),
                })
            }
        }
    }
    Ok(out)
}
