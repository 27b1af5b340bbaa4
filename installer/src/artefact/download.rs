//! Release archive download.
//!
//! Provides a trait-based abstraction over fetching the wintun archive so
//! the orchestrator can be exercised without network access.

use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

/// Trait for downloading an archive to a local file.
///
/// # Examples
///
/// ```
/// use wintundll_installer::artefact::download::HttpDownloader;
///
/// let downloader = HttpDownloader::new();
/// // Use downloader.download_archive(url, dest, timeout) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveDownloader {
    /// Download `url` into a new file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-200 status, or the body cannot be written.
    fn download_archive(&self, url: &str, dest: &Path, timeout: Duration)
    -> Result<(), DownloadError>;
}

/// Errors arising from archive download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The HTTP request could not be made or the body could not be read.
    #[error("failed to make http request to {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered with something other than 200 OK.
    #[error("got a non-200 status code ({status}) from {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code received.
        status: u16,
    },

    /// I/O error writing the downloaded file.
    #[error("failed to write downloaded file contents: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Create a downloader with a fresh `ureq` agent.
    #[must_use]
    pub fn new() -> Self {
        Self::with_agent(ureq::Agent::new_with_defaults())
    }

    /// Create a downloader around a caller-supplied agent.
    ///
    /// TLS and proxy behaviour come from the agent's configuration.
    #[must_use]
    pub const fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveDownloader for HttpDownloader {
    fn download_archive(
        &self,
        url: &str,
        dest: &Path,
        timeout: Duration,
    ) -> Result<(), DownloadError> {
        let mut file = std::fs::File::create(dest)?;
        download(&self.agent, url, &mut file, timeout)?;
        file.flush()?;
        Ok(())
    }
}

/// Issue a single GET for `url` and stream the body into `sink`.
///
/// Any status other than 200 is an error carrying that status. There are no
/// retries.
///
/// # Errors
///
/// Returns [`DownloadError::Transport`] if the request fails, the body
/// cannot be read, or the timeout elapses at any point before the body is
/// complete. Returns [`DownloadError::Status`] on a non-200 answer and
/// [`DownloadError::Io`] if the sink rejects a write.
pub fn download(
    agent: &ureq::Agent,
    url: &str,
    sink: &mut dyn Write,
    timeout: Duration,
) -> Result<(), DownloadError> {
    let response = agent
        .get(url)
        .config()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(DownloadError::Status {
            url: url.to_owned(),
            status,
        });
    }

    copy_body(url, &mut response.into_body().into_reader(), sink)
}

/// Stream `body` into `sink`, keeping read failures apart from write
/// failures.
fn copy_body(
    url: &str,
    body: &mut dyn Read,
    sink: &mut dyn Write,
) -> Result<(), DownloadError> {
    let mut buffer = [0_u8; 8192];
    loop {
        let read = match body.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                return Err(DownloadError::Transport {
                    url: url.to_owned(),
                    reason: err.to_string(),
                });
            }
        };
        let chunk = buffer.get(..read).unwrap_or_default();
        sink.write_all(chunk)?;
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
