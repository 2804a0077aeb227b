//! Download error type and curl error classification.

use thiserror::Error;

/// Why an archive GET failed.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Connect or total timeout elapsed.
    #[error("timed out: {0}")]
    Timeout(#[source] curl::Error),
    /// Could not resolve, connect, or the connection dropped mid-transfer.
    #[error("connection failed: {0}")]
    Connection(#[source] curl::Error),
    /// Any other libcurl failure.
    #[error("{0}")]
    Curl(#[source] curl::Error),
    /// Writing the archive into the scratch area failed.
    #[error("write archive: {0}")]
    Io(#[from] std::io::Error),
}

impl From<curl::Error> for DownloadError {
    fn from(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            return DownloadError::Timeout(e);
        }
        if e.is_couldnt_connect()
            || e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
            || e.is_partial_file()
        {
            return DownloadError::Connection(e);
        }
        DownloadError::Curl(e)
    }
}

/// Anything outside 2xx is a download failure (redirects are followed before this check).
pub fn check_http_status(code: u32) -> Result<(), DownloadError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(DownloadError::Http(code))
    }
}
