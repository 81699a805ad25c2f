//! Release version newtype.
//!
//! Release versions are semantic-version-like strings such as `0.2.0` or
//! `0.0.1-test`. A leading `v` (as used in release tags) is accepted and
//! stripped.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A validated release version.
///
/// Ordering follows semantic-version precedence, so pre-releases sort below
/// their release.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::release_version::ReleaseVersion;
///
/// let version = ReleaseVersion::try_from("v0.2.0").expect("valid version");
/// assert_eq!(version.as_str(), "0.2.0");
/// assert_eq!(version.tag(), "v0.2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseVersion {
    raw: String,
    parsed: semver::Version,
}

impl ReleaseVersion {
    /// Return the version without a `v` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Return the release tag, `v<version>`.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{}", self.raw)
    }

    /// Whether this is a pre-release such as `0.0.1-test`.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.parsed.pre.is_empty()
    }
}

impl TryFrom<&str> for ReleaseVersion {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parsed = semver::Version::parse(raw).map_err(|e| ArtefactError::InvalidVersion {
            value: value.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_owned(),
            parsed,
        })
    }
}

impl TryFrom<String> for ReleaseVersion {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl From<ReleaseVersion> for String {
    fn from(value: ReleaseVersion) -> Self {
        value.raw
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
