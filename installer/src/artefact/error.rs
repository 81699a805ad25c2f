//! Error types for release versions, platforms, digests, and release tables.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// The requested platform is outside the supported matrix, or the
    /// selected release records no artefact for it.
    #[error("unsupported platform {platform} for rime {version}; expected one of: {expected}")]
    UnsupportedPlatform {
        /// The rejected platform, rendered as `<os>-<arch>`.
        platform: String,
        /// The release version that was being resolved.
        version: String,
        /// Comma-separated list of platforms available for the release.
        expected: String,
    },

    /// The requested version is not present in the release table.
    #[error("unknown rime version {version}; known versions: {known}")]
    UnknownVersion {
        /// The rejected version string.
        version: String,
        /// Comma-separated list of versions in the table.
        known: String,
    },

    /// A version string is not semantic-version-like.
    #[error("invalid release version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },

    /// An artefact URL does not reference its release exactly once.
    #[error("artefact URL {url} must reference v{version} exactly once")]
    UrlVersionMismatch {
        /// The rejected URL.
        url: String,
        /// The release version the URL should reference.
        version: String,
    },

    /// A release table could not be parsed or failed validation.
    #[error("invalid release table: {reason}")]
    InvalidReleaseTable {
        /// Description of the failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
