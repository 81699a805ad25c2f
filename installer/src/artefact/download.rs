//! Artefact download over HTTPS.
//!
//! Provides a trait-based abstraction for fetching release archives,
//! enabling dependency injection for testing. The production implementation
//! uses a blocking `ureq` agent with a global request timeout.

use std::io::Read;
use std::time::Duration;

/// Default network timeout for artefact downloads.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for downloading release archives.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::download::HttpDownloader;
///
/// let downloader = HttpDownloader::default();
/// // Use downloader.download(url) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Fetch `url` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] on transport failure and
    /// [`DownloadError::HttpStatus`] on a non-success response.
    fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Errors arising from artefact download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request could not be completed (DNS, TLS, connection, timeout).
    #[error("download failed for {url}: {reason}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("download of {url} returned HTTP {status}")]
    HttpStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

/// HTTP-based downloader using `ureq`.
#[derive(Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDownloader").finish_non_exhaustive()
    }
}

impl HttpDownloader {
    /// Create a downloader whose requests time out after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_DOWNLOAD_TIMEOUT)
    }
}

impl ArtefactDownloader for HttpDownloader {
    fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut body = Vec::new();
        response
            .into_body()
            .as_reader()
            .read_to_end(&mut body)
            .map_err(|e| DownloadError::Network {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        log::debug!("downloaded {} bytes from {url}", body.len());
        Ok(body)
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => DownloadError::HttpStatus {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Network {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
