//! Output formatting for release listing.
//!
//! This module formats the release table for human-readable or JSON
//! output, newest release first.

use serde::Serialize;

use crate::artefact::manifest::ReleaseTable;

/// Format the release table for human-readable output.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::manifest_parser::bundled_release_table;
/// use rime_installer::list_output::format_human;
///
/// let table = bundled_release_table().expect("bundled table parses");
/// let output = format_human(&table);
/// assert!(output.contains("0.2.0 (latest)"));
/// ```
#[must_use]
pub fn format_human(table: &ReleaseTable) -> String {
    let latest = table.latest().map(|manifest| manifest.version().as_str());
    let mut output = String::from("Available releases:\n");

    for manifest in table.newest_first() {
        let version = manifest.version().as_str();
        let marker = if Some(version) == latest {
            " (latest)"
        } else {
            ""
        };
        output.push('\n');
        output.push_str(&format!("rime {version}{marker}\n"));
        for (platform, descriptor) in manifest.artifacts() {
            output.push_str(&format!("  {platform}\n"));
            output.push_str(&format!("    url:    {}\n", descriptor.url()));
            output.push_str(&format!("    sha256: {}\n", descriptor.sha256()));
        }
    }

    output
}

/// Format the release table as JSON.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::manifest_parser::bundled_release_table;
/// use rime_installer::list_output::format_json;
///
/// let table = bundled_release_table().expect("bundled table parses");
/// let json = format_json(&table);
/// assert!(json.contains("\"releases\""));
/// ```
#[must_use]
pub fn format_json(table: &ReleaseTable) -> String {
    let json_data = ReleasesJson::from_table(table);

    // Use pretty printing for readability
    serde_json::to_string_pretty(&json_data).unwrap_or_else(|_| "{}".to_owned())
}

/// JSON-serializable representation of the release table.
#[derive(Debug, Serialize)]
pub struct ReleasesJson {
    /// Releases, newest first.
    pub releases: Vec<ReleaseEntry>,
}

impl ReleasesJson {
    fn from_table(table: &ReleaseTable) -> Self {
        let latest = table.latest().map(|manifest| manifest.version().as_str());
        let releases = table
            .newest_first()
            .map(|manifest| {
                let version = manifest.version().as_str();
                ReleaseEntry {
                    version: version.to_owned(),
                    latest: Some(version) == latest,
                    artifacts: manifest
                        .artifacts()
                        .map(|(platform, descriptor)| ArtifactEntry {
                            platform: platform.asset_key(),
                            url: descriptor.url().to_owned(),
                            sha256: descriptor.sha256().as_str().to_owned(),
                        })
                        .collect(),
                }
            })
            .collect();
        Self { releases }
    }
}

/// JSON entry for a release.
#[derive(Debug, Serialize)]
pub struct ReleaseEntry {
    /// Release version.
    pub version: String,
    /// Whether this is the newest release.
    pub latest: bool,
    /// Per-platform artefacts.
    pub artifacts: Vec<ArtifactEntry>,
}

/// JSON entry for a platform artefact.
#[derive(Debug, Serialize)]
pub struct ArtifactEntry {
    /// Platform asset key, e.g. `darwin-arm64`.
    pub platform: String,
    /// Archive URL.
    pub url: String,
    /// Expected SHA-256 digest.
    pub sha256: String,
}
