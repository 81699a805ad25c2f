//! Unit tests for release manifests and platform resolution.

use super::*;
use crate::artefact::manifest_parser::bundled_release_table;
use rstest::{fixture, rstest};

fn digest(fill: char) -> Sha256Digest {
    Sha256Digest::try_from(fill.to_string().repeat(64)).expect("valid digest")
}

fn full_manifest(version: &str) -> ReleaseManifest {
    let version = ReleaseVersion::try_from(version).expect("valid version");
    let artifacts = Platform::supported()
        .into_iter()
        .map(|platform| {
            let url = release_asset_url(DEFAULT_REPOSITORY, &version, &platform);
            let descriptor =
                ArtifactDescriptor::new(url, digest('c'), &version).expect("valid descriptor");
            (platform, descriptor)
        })
        .collect();
    ReleaseManifest::new(version, artifacts).expect("valid manifest")
}

#[fixture]
fn table() -> ReleaseTable {
    bundled_release_table().expect("bundled table is valid")
}

#[rstest]
#[case::macos_arm("macos", "arm64")]
#[case::macos_intel("macos", "amd64")]
#[case::macos_x86_64_alias("darwin", "x86_64")]
#[case::linux_intel("linux", "amd64")]
fn supported_pairs_resolve_to_versioned_url(
    #[case] os: &str,
    #[case] arch: &str,
    #[values("0.2.0", "0.1.1", "0.0.1-test")] version: &str,
) {
    let manifest = full_manifest(version);
    let descriptor = resolve_artifact(&manifest, os, arch).expect("supported pair");
    assert_eq!(descriptor.url().matches(&format!("v{version}")).count(), 1);
}

#[rstest]
#[case::linux_arm("linux", "arm64")]
#[case::windows("windows", "amd64")]
#[case::freebsd("freebsd", "amd64")]
fn unsupported_pairs_fail(#[case] os: &str, #[case] arch: &str) {
    let manifest = full_manifest("0.2.0");
    let err = resolve_artifact(&manifest, os, arch).expect_err("unsupported pair");
    assert!(
        matches!(err, ArtefactError::UnsupportedPlatform { ref version, .. } if version == "0.2.0"),
        "unexpected error: {err}"
    );
}

#[rstest]
fn resolves_recorded_darwin_arm64_release(table: ReleaseTable) {
    let manifest = table.get("0.2.0").expect("known release");
    let descriptor = resolve_artifact(manifest, "macos", "arm64").expect("recorded");
    assert_eq!(
        descriptor.url(),
        "https://github.com/rimelabs/rime-cli/releases/download/v0.2.0/rime-darwin-arm64.tar.gz"
    );
    assert_eq!(
        descriptor.sha256().as_str(),
        "b3d35f8c126dc1282c8a1d09b002db7b09ee9be044d1cc75348a6f898e26410a"
    );
}

#[rstest]
fn resolves_recorded_linux_amd64_release(table: ReleaseTable) {
    let manifest = table.get("v0.1.1").expect("known release");
    let descriptor = resolve_artifact(manifest, "linux", "amd64").expect("recorded");
    assert!(descriptor.url().ends_with("/v0.1.1/rime-linux-amd64.tar.gz"));
    assert_eq!(
        descriptor.sha256().as_str(),
        "e88c84017f57c4717294e99102b6dc476119195e3b95a83fcc97abba6b0df8b7"
    );
}

#[rstest]
fn missing_platform_in_release_lists_available_keys(table: ReleaseTable) {
    let manifest = table.get("0.1.1").expect("known release");
    let err = resolve_artifact(manifest, "macos", "arm64").expect_err("not recorded");
    match err {
        ArtefactError::UnsupportedPlatform { expected, .. } => {
            assert_eq!(expected, "linux-amd64");
        }
        other => panic!("expected UnsupportedPlatform, got {other:?}"),
    }
}

#[rstest]
fn latest_is_highest_version(table: ReleaseTable) {
    let latest = table.latest().expect("non-empty table");
    assert_eq!(latest.version().as_str(), "0.2.0");
}

#[rstest]
fn unknown_version_lists_known_versions(table: ReleaseTable) {
    let err = table.get("9.9.9").expect_err("unknown version");
    assert_eq!(
        err,
        ArtefactError::UnknownVersion {
            version: "9.9.9".to_owned(),
            known: "0.2.0, 0.1.1".to_owned(),
        }
    );
}

#[test]
fn descriptor_rejects_url_without_tag() {
    let version = ReleaseVersion::try_from("0.2.0").expect("valid");
    let err = ArtifactDescriptor::new("https://x.test/rime.tgz", digest('a'), &version)
        .expect_err("url lacks tag");
    assert!(matches!(err, ArtefactError::UrlVersionMismatch { .. }));
}

#[rstest]
#[case::longer_patch("https://github.com/rimelabs/rime-cli/releases/download/v0.1.10/rime-linux-amd64.tar.gz")]
#[case::prerelease("https://github.com/rimelabs/rime-cli/releases/download/v0.1.1-rc1/rime-linux-amd64.tar.gz")]
#[case::build_metadata("https://x.test/v0.1.1+nightly/rime.tgz")]
#[case::extra_component("https://x.test/v0.1.1.5/rime.tgz")]
fn descriptor_rejects_url_naming_another_release(#[case] url: &str) {
    let version = ReleaseVersion::try_from("0.1.1").expect("valid");
    let err = ArtifactDescriptor::new(url, digest('a'), &version)
        .expect_err("url names a different release");
    assert!(matches!(err, ArtefactError::UrlVersionMismatch { .. }));
}

#[rstest]
#[case::path_segment("https://x.test/download/v0.1.1/rime-linux-amd64.tar.gz")]
#[case::file_suffix("https://x.test/rime-v0.1.1.tar.gz")]
#[case::at_end("https://x.test/releases/tag/v0.1.1")]
fn descriptor_accepts_whole_tag(#[case] url: &str) {
    let version = ReleaseVersion::try_from("0.1.1").expect("valid");
    assert!(ArtifactDescriptor::new(url, digest('a'), &version).is_ok());
}

#[rstest]
fn latest_for_skips_releases_without_the_platform(table: ReleaseTable) {
    let linux = Platform::from_names("linux", "amd64");
    let darwin = Platform::from_names("macos", "arm64");
    let latest_linux = table.latest_for(&linux).expect("non-empty table");
    let latest_darwin = table.latest_for(&darwin).expect("non-empty table");
    assert_eq!(latest_linux.version().as_str(), "0.1.1");
    assert_eq!(latest_darwin.version().as_str(), "0.2.0");
}

#[rstest]
fn latest_for_unpublished_platform_falls_back_to_newest(table: ReleaseTable) {
    let windows = Platform::from_names("windows", "amd64");
    let latest = table.latest_for(&windows).expect("non-empty table");
    assert_eq!(latest.version().as_str(), "0.2.0");
}

#[test]
fn descriptor_rejects_url_with_repeated_tag() {
    let version = ReleaseVersion::try_from("0.2.0").expect("valid");
    let err = ArtifactDescriptor::new(
        "https://x.test/v0.2.0/rime-v0.2.0.tgz",
        digest('a'),
        &version,
    )
    .expect_err("tag appears twice");
    assert!(matches!(err, ArtefactError::UrlVersionMismatch { .. }));
}

#[test]
fn manifest_rejects_unsupported_platform_entries() {
    let version = ReleaseVersion::try_from("0.2.0").expect("valid");
    let platform = Platform::from_names("linux", "arm64");
    let url = release_asset_url(DEFAULT_REPOSITORY, &version, &platform);
    let descriptor = ArtifactDescriptor::new(url, digest('a'), &version).expect("valid");
    let err = ReleaseManifest::new(version, [(platform, descriptor)].into_iter().collect())
        .expect_err("unsupported platform");
    assert!(matches!(err, ArtefactError::InvalidReleaseTable { .. }));
}

#[test]
fn table_orders_newest_first() {
    let table = ReleaseTable::new([
        full_manifest("0.1.1"),
        full_manifest("0.10.0"),
        full_manifest("0.2.0"),
    ])
    .expect("valid table");
    let versions: Vec<&str> = table
        .newest_first()
        .map(|manifest| manifest.version().as_str())
        .collect();
    assert_eq!(versions, ["0.10.0", "0.2.0", "0.1.1"]);
}
