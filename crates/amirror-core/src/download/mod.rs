//! Archive download: one libcurl GET streamed into a file in the scratch area.
//!
//! Blocking; the dispatcher runs it on the blocking pool. The body is hashed
//! while it is written so the digest of what landed on disk is reported
//! without a second read.

mod error;

pub use error::{check_http_status, DownloadError};

use crate::config::HttpConfig;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use url::Url;

/// What a successful download wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the archive.
    pub sha256: String,
}

/// GETs `url` into `dest` (created or truncated). Follows redirects.
/// Fails on non-2xx status, timeout, connection failure or a local write error.
pub fn download_archive(
    url: &Url,
    dest: &Path,
    http: &HttpConfig,
) -> Result<Downloaded, DownloadError> {
    let file = File::create(dest)?;
    let sink = RefCell::new(BufWriter::new(file));
    let hasher = RefCell::new(Sha256::new());
    let written = RefCell::new(0u64);
    let write_err: RefCell<Option<std::io::Error>> = RefCell::new(None);

    let mut easy = curl::easy::Easy::new();
    easy.url(url.as_str())?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&http.user_agent)?;
    easy.connect_timeout(http.connect_timeout())?;
    easy.timeout(http.timeout())?;
    easy.fail_on_error(false)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match sink.borrow_mut().write_all(data) {
            Ok(()) => {
                hasher.borrow_mut().update(data);
                *written.borrow_mut() += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                tracing::warn!("archive write failed: {}", e);
                *write_err.borrow_mut() = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err.into_inner() {
        return Err(DownloadError::Io(e));
    }
    performed?;

    // libcurl reports 0 for file:// transfers; only HTTP(S) carries a status.
    if url.scheme() != "file" {
        let code = easy.response_code()?;
        check_http_status(code)?;
    }

    sink.into_inner()
        .into_inner()
        .map_err(|e| DownloadError::Io(e.into_error()))?
        .sync_all()?;

    Ok(Downloaded {
        bytes: written.into_inner(),
        sha256: hex::encode(hasher.into_inner().finalize()),
    })
}
