//! Release table deserialization.
//!
//! Release tables are TOML documents listing one `[[release]]` entry per
//! version, each with per-platform `{ url, sha256 }` artefacts. The URL may
//! be omitted, in which case it is derived from the table's `repository`
//! with [`release_asset_url`]. All newtype validation runs while parsing, so
//! a table that parses is safe to resolve against.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::{ArtefactError, Result};
use super::manifest::{
    ArtifactDescriptor, DEFAULT_REPOSITORY, ReleaseManifest, ReleaseTable, release_asset_url,
};
use super::platform::Platform;
use super::release_version::ReleaseVersion;
use super::sha256_digest::Sha256Digest;

/// The release table compiled into the installer.
const BUNDLED_RELEASES: &str = include_str!("../../data/releases.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReleaseTable {
    #[serde(default)]
    repository: Option<String>,
    #[serde(default, rename = "release")]
    releases: Vec<RawRelease>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelease {
    version: ReleaseVersion,
    #[serde(default)]
    artifacts: BTreeMap<String, RawArtifact>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArtifact {
    #[serde(default)]
    url: Option<String>,
    sha256: Sha256Digest,
}

/// Parse a TOML release table.
///
/// # Errors
///
/// Returns [`ArtefactError::InvalidReleaseTable`] if the document is
/// malformed, lists an unknown platform key, repeats a version, or contains
/// no releases; returns [`ArtefactError::UrlVersionMismatch`] if an explicit
/// URL does not reference its release.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::manifest_parser::parse_release_table;
///
/// let toml = r#"
/// [[release]]
/// version = "0.0.1-test"
///
/// [release.artifacts.linux-amd64]
/// sha256 = "e88c84017f57c4717294e99102b6dc476119195e3b95a83fcc97abba6b0df8b7"
/// "#;
/// let table = parse_release_table(toml).expect("valid table");
/// let latest = table.latest().expect("one release");
/// assert_eq!(latest.version().as_str(), "0.0.1-test");
/// ```
pub fn parse_release_table(toml_text: &str) -> Result<ReleaseTable> {
    let raw: RawReleaseTable =
        toml::from_str(toml_text).map_err(|e| ArtefactError::InvalidReleaseTable {
            reason: e.to_string(),
        })?;
    let repository = raw.repository.as_deref().unwrap_or(DEFAULT_REPOSITORY);
    let manifests = raw
        .releases
        .into_iter()
        .map(|release| build_manifest(repository, release))
        .collect::<Result<Vec<_>>>()?;
    ReleaseTable::new(manifests)
}

/// Parse the release table compiled into the installer.
///
/// # Errors
///
/// Returns an error only if the bundled data file is itself invalid.
pub fn bundled_release_table() -> Result<ReleaseTable> {
    parse_release_table(BUNDLED_RELEASES)
}

fn build_manifest(repository: &str, release: RawRelease) -> Result<ReleaseManifest> {
    let RawRelease { version, artifacts } = release;
    let mut descriptors = BTreeMap::new();
    for (key, artifact) in artifacts {
        let platform = Platform::from_asset_key(&key)?;
        let url = artifact
            .url
            .unwrap_or_else(|| release_asset_url(repository, &version, &platform));
        let descriptor = ArtifactDescriptor::new(url, artifact.sha256, &version)?;
        descriptors.insert(platform, descriptor);
    }
    ReleaseManifest::new(version, descriptors)
}
