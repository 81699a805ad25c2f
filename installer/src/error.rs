//! Error types for the rime installer.
//!
//! Stage-specific errors from the [`artefact`](crate::artefact) module fold
//! into [`InstallerError`]. Every error maps to an [`ErrorKind`] so that a
//! failed install can report what went wrong independently of the message
//! text. Where a user can act on the failure, the message says how.

use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::verification::ChecksumMismatch;
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// Coarse classification of installer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No artefact exists for the requested OS and architecture.
    UnsupportedPlatform,
    /// The requested version is not in the release table.
    UnknownVersion,
    /// The release table or a value in it is invalid.
    InvalidManifest,
    /// The download could not be completed.
    NetworkError,
    /// The download returned a non-success HTTP status.
    HttpStatusError,
    /// The downloaded bytes did not match the recorded digest.
    ChecksumMismatch,
    /// The archive was malformed or lacked the executable.
    ArchiveError,
    /// Writing or removing files failed.
    FileSystemError,
    /// The installed executable did not report the expected version.
    VerificationFailed,
    /// Installer configuration could not be loaded.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsupportedPlatform => "UnsupportedPlatform",
            Self::UnknownVersion => "UnknownVersion",
            Self::InvalidManifest => "InvalidManifest",
            Self::NetworkError => "NetworkError",
            Self::HttpStatusError => "HttpStatusError",
            Self::ChecksumMismatch => "ChecksumMismatch",
            Self::ArchiveError => "ArchiveError",
            Self::FileSystemError => "FileSystemError",
            Self::VerificationFailed => "VerificationFailed",
            Self::Configuration => "Configuration",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while installing or removing rime.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// A release table lookup or validation failed.
    #[error(transparent)]
    Artefact(#[from] ArtefactError),

    /// The archive download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The archive digest did not match the release table.
    #[error("{0}; the download may be corrupted or tampered with")]
    ChecksumMismatch(#[from] ChecksumMismatch),

    /// The executable could not be extracted from the archive.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A file system operation failed.
    #[error("cannot {action} {path}: {reason}")]
    FileSystem {
        /// What was being attempted, e.g. "write".
        action: &'static str,
        /// The path involved.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// The installed executable did not report the expected version.
    #[error("{path} --version did not report {expected}; output was: {output}")]
    VerificationFailed {
        /// The executable that was run.
        path: Utf8PathBuf,
        /// The version that was expected in the output.
        expected: String,
        /// The captured output, trimmed.
        output: String,
    },

    /// The installer configuration is invalid or could not be read.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the problem.
        reason: String,
    },

    /// The binary is managed by Homebrew and must be removed with it.
    #[error("{path} is managed by Homebrew; run: brew uninstall rime")]
    HomebrewManaged {
        /// The Homebrew-managed executable path.
        path: Utf8PathBuf,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallerError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Artefact(err) => match err {
                ArtefactError::UnsupportedPlatform { .. } => ErrorKind::UnsupportedPlatform,
                ArtefactError::UnknownVersion { .. } | ArtefactError::InvalidVersion { .. } => {
                    ErrorKind::UnknownVersion
                }
                ArtefactError::InvalidSha256Digest { .. }
                | ArtefactError::UrlVersionMismatch { .. }
                | ArtefactError::InvalidReleaseTable { .. } => ErrorKind::InvalidManifest,
            },
            Self::Download(DownloadError::Network { .. }) => ErrorKind::NetworkError,
            Self::Download(DownloadError::HttpStatus { .. }) => ErrorKind::HttpStatusError,
            Self::ChecksumMismatch(_) => ErrorKind::ChecksumMismatch,
            Self::Extraction(_) => ErrorKind::ArchiveError,
            Self::FileSystem { .. } | Self::HomebrewManaged { .. } | Self::Io(_) => {
                ErrorKind::FileSystemError
            }
            Self::VerificationFailed { .. } => ErrorKind::VerificationFailed,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Build a [`InstallerError::FileSystem`] from an I/O error.
    pub(crate) fn file_system(
        action: &'static str,
        path: impl Into<Utf8PathBuf>,
        source: &std::io::Error,
    ) -> Self {
        Self::FileSystem {
            action,
            path: path.into(),
            reason: source.to_string(),
        }
    }
}

/// A failed install attempt, naming the version and platform it targeted.
#[derive(Debug, Error)]
#[error("[{kind}] installing rime {version} for {platform} failed: {source}")]
pub struct InstallFailure {
    /// The version being installed.
    pub version: String,
    /// The platform being installed for, as an asset key.
    pub platform: String,
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// The underlying error.
    #[source]
    pub source: InstallerError,
}

impl InstallFailure {
    /// Wrap `source` with the attempted version and platform.
    #[must_use]
    pub fn new(version: impl Into<String>, platform: impl Into<String>, source: InstallerError) -> Self {
        Self {
            version: version.into(),
            platform: platform.into(),
            kind: source.kind(),
            source,
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
