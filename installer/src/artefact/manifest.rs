//! Release manifest schema and platform resolution.
//!
//! A [`ReleaseManifest`] maps each supported [`Platform`] of one release to
//! the [`ArtifactDescriptor`] (download URL and SHA-256 digest) of its
//! archive. A [`ReleaseTable`] collects the manifests of every known
//! release. Both are immutable once constructed; all validation happens at
//! construction time so that resolution is a pure lookup.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{ArtefactError, Result};
use super::platform::Platform;
use super::release_version::ReleaseVersion;
use super::sha256_digest::Sha256Digest;

/// Default GitHub repository publishing rime releases.
pub const DEFAULT_REPOSITORY: &str = "rimelabs/rime-cli";

/// Name of the executable inside every release archive.
pub const EXECUTABLE_NAME: &str = "rime";

/// Build the canonical release asset URL for `platform` in `version`.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::manifest::{DEFAULT_REPOSITORY, release_asset_url};
/// use rime_installer::artefact::platform::Platform;
/// use rime_installer::artefact::release_version::ReleaseVersion;
///
/// let version = ReleaseVersion::try_from("0.2.0").expect("valid version");
/// let platform = Platform::from_names("macos", "arm64");
/// assert_eq!(
///     release_asset_url(DEFAULT_REPOSITORY, &version, &platform),
///     "https://github.com/rimelabs/rime-cli/releases/download/v0.2.0/rime-darwin-arm64.tar.gz",
/// );
/// ```
#[must_use]
pub fn release_asset_url(repository: &str, version: &ReleaseVersion, platform: &Platform) -> String {
    format!(
        "https://github.com/{repository}/releases/download/{}/{EXECUTABLE_NAME}-{}.tar.gz",
        version.tag(),
        platform.asset_key()
    )
}

/// Count the places `tag` appears in `url` as a whole version.
fn tag_occurrences(url: &str, tag: &str) -> usize {
    url.match_indices(tag)
        .filter(|(start, _)| {
            let mut rest = url.get(start + tag.len()..).unwrap_or_default().chars();
            match rest.next() {
                None => true,
                Some('.') => !rest.next().is_some_and(|c| c.is_ascii_digit()),
                Some(c) => !(c.is_ascii_alphanumeric() || c == '+' || c == '-'),
            }
        })
        .count()
}

/// Location and expected digest of one platform archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    url: String,
    sha256: Sha256Digest,
}

impl ArtifactDescriptor {
    /// Create a descriptor for an archive belonging to `version`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UrlVersionMismatch`] unless `url` contains
    /// the release tag `v<version>` exactly once. A tag that continues into
    /// a longer version (`v0.1.10`, `v0.1.1-rc1`) does not count.
    pub fn new(url: impl Into<String>, sha256: Sha256Digest, version: &ReleaseVersion) -> Result<Self> {
        let url = url.into();
        if tag_occurrences(&url, &version.tag()) != 1 {
            return Err(ArtefactError::UrlVersionMismatch {
                url,
                version: version.as_str().to_owned(),
            });
        }
        Ok(Self { url, sha256 })
    }

    /// The archive download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The expected SHA-256 digest of the archive.
    #[must_use]
    pub fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }
}

/// Per-platform artefacts of one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseManifest {
    version: ReleaseVersion,
    artifacts: BTreeMap<Platform, ArtifactDescriptor>,
}

impl ReleaseManifest {
    /// Create a manifest for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidReleaseTable`] if any platform is
    /// outside the supported set.
    pub fn new(
        version: ReleaseVersion,
        artifacts: BTreeMap<Platform, ArtifactDescriptor>,
    ) -> Result<Self> {
        if let Some(platform) = artifacts.keys().find(|platform| !platform.is_supported()) {
            return Err(ArtefactError::InvalidReleaseTable {
                reason: format!("release {version} lists unsupported platform {platform}"),
            });
        }
        Ok(Self { version, artifacts })
    }

    /// The release version.
    #[must_use]
    pub fn version(&self) -> &ReleaseVersion {
        &self.version
    }

    /// Iterate over the platforms this release publishes, in key order.
    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.artifacts.keys()
    }

    /// Iterate over `(platform, descriptor)` pairs.
    pub fn artifacts(&self) -> impl Iterator<Item = (&Platform, &ArtifactDescriptor)> {
        self.artifacts.iter()
    }

    /// Look up the descriptor for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] when the platform is
    /// not supported or the release has no artefact for it.
    pub fn resolve(&self, platform: &Platform) -> Result<&ArtifactDescriptor> {
        self.artifacts
            .get(platform)
            .ok_or_else(|| ArtefactError::UnsupportedPlatform {
                platform: platform.to_string(),
                version: self.version.to_string(),
                expected: self
                    .artifacts
                    .keys()
                    .map(Platform::asset_key)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Resolve the artefact for an `(os, arch)` pair named as free-form strings.
///
/// # Errors
///
/// Returns [`ArtefactError::UnsupportedPlatform`] when no artefact exists
/// for the pair.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::manifest::resolve_artifact;
/// use rime_installer::artefact::manifest_parser::bundled_release_table;
///
/// let table = bundled_release_table().expect("bundled table parses");
/// let manifest = table.get("0.1.1").expect("known release");
/// let descriptor = resolve_artifact(manifest, "linux", "amd64").expect("supported");
/// assert!(descriptor.url().ends_with("/v0.1.1/rime-linux-amd64.tar.gz"));
///
/// assert!(resolve_artifact(manifest, "linux", "arm64").is_err());
/// ```
pub fn resolve_artifact<'a>(
    manifest: &'a ReleaseManifest,
    os: &str,
    arch: &str,
) -> Result<&'a ArtifactDescriptor> {
    manifest.resolve(&Platform::from_names(os, arch))
}

/// Every known release, ordered by version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTable {
    releases: BTreeMap<ReleaseVersion, ReleaseManifest>,
}

impl ReleaseTable {
    /// Build a table from release manifests.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidReleaseTable`] when the list is empty
    /// or a version appears twice.
    pub fn new(manifests: impl IntoIterator<Item = ReleaseManifest>) -> Result<Self> {
        let mut releases = BTreeMap::new();
        for manifest in manifests {
            let version = manifest.version().clone();
            if releases.insert(version.clone(), manifest).is_some() {
                return Err(ArtefactError::InvalidReleaseTable {
                    reason: format!("release {version} is listed more than once"),
                });
            }
        }
        if releases.is_empty() {
            return Err(ArtefactError::InvalidReleaseTable {
                reason: "no releases listed".to_owned(),
            });
        }
        Ok(Self { releases })
    }

    /// Return the newest release.
    #[must_use]
    pub fn latest(&self) -> Option<&ReleaseManifest> {
        self.releases.values().next_back()
    }

    /// Return the newest release publishing `platform`, falling back to the
    /// newest release when none does.
    #[must_use]
    pub fn latest_for(&self, platform: &Platform) -> Option<&ReleaseManifest> {
        self.newest_first()
            .find(|manifest| manifest.artifacts.contains_key(platform))
            .or_else(|| self.latest())
    }

    /// Look up a release by version string (a leading `v` is accepted).
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidVersion`] for malformed input and
    /// [`ArtefactError::UnknownVersion`] for versions not in the table.
    pub fn get(&self, version: &str) -> Result<&ReleaseManifest> {
        let parsed = ReleaseVersion::try_from(version)?;
        self.releases
            .get(&parsed)
            .ok_or_else(|| ArtefactError::UnknownVersion {
                version: parsed.to_string(),
                known: self
                    .releases
                    .keys()
                    .rev()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Iterate over releases, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &ReleaseManifest> {
        self.releases.values().rev()
    }

    /// Number of releases in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Whether the table is empty. Always false for a constructed table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
