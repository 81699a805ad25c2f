//! BDD tests for resolving release artefacts from the bundled table.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rime_installer::artefact::error::ArtefactError;
use rime_installer::artefact::manifest::{ReleaseTable, resolve_artifact};
use rime_installer::artefact::manifest_parser::bundled_release_table;
use rime_installer::error::InstallerError;

#[derive(Default)]
struct ResolutionWorld {
    table: Option<ReleaseTable>,
    result: Option<Result<(String, String), ArtefactError>>,
}

impl ResolutionWorld {
    fn resolved(&self) -> &(String, String) {
        self.result
            .as_ref()
            .expect("resolution attempted")
            .as_ref()
            .expect("resolution should succeed")
    }

    fn error(&self) -> &ArtefactError {
        self.result
            .as_ref()
            .expect("resolution attempted")
            .as_ref()
            .expect_err("resolution should fail")
    }
}

#[fixture]
fn world() -> ResolutionWorld {
    ResolutionWorld::default()
}

#[given("the bundled release table")]
fn given_bundled_table(world: &mut ResolutionWorld) {
    world.table = Some(bundled_release_table().expect("bundled table parses"));
}

#[when("rime \"{version}\" is resolved for \"{os}\" \"{arch}\"")]
fn when_resolved(world: &mut ResolutionWorld, version: String, os: String, arch: String) {
    let table = world.table.as_ref().expect("table loaded");
    let result = table.get(&version).and_then(|manifest| {
        resolve_artifact(manifest, &os, &arch)
            .map(|artifact| (artifact.url().to_owned(), artifact.sha256().to_string()))
    });
    world.result = Some(result);
}

#[then("the artefact URL is \"{url}\"")]
fn then_url(world: &mut ResolutionWorld, url: String) {
    assert_eq!(world.resolved().0, url);
}

#[then("the artefact digest is \"{sha256}\"")]
fn then_digest(world: &mut ResolutionWorld, sha256: String) {
    assert_eq!(world.resolved().1, sha256);
}

#[then("resolution fails with \"{kind}\"")]
fn then_fails_with(world: &mut ResolutionWorld, kind: String) {
    let err = InstallerError::from(world.error().clone());
    assert_eq!(err.kind().to_string(), kind, "unexpected error: {err}");
}

#[then("the error mentions \"{text}\"")]
fn then_error_mentions(world: &mut ResolutionWorld, text: String) {
    let message = world.error().to_string();
    assert!(
        message.contains(&text),
        "expected error to mention '{text}', got: {message}"
    );
}

#[then("the latest release is \"{version}\"")]
fn then_latest(world: &mut ResolutionWorld, version: String) {
    let table = world.table.as_ref().expect("table loaded");
    let latest = table.latest().expect("table is not empty");
    assert_eq!(latest.version().as_str(), version);
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Resolve 0.2.0 for macOS on Apple silicon"
)]
fn scenario_resolve_darwin_arm64(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Resolve 0.1.1 for Linux on x86-64"
)]
fn scenario_resolve_linux_amd64(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Linux on ARM is unsupported"
)]
fn scenario_linux_arm64_unsupported(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Windows is unsupported"
)]
fn scenario_windows_unsupported(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Unknown versions list the known ones"
)]
fn scenario_unknown_version(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "The newest release is the default"
)]
fn scenario_latest_release(world: ResolutionWorld) {
    let _ = world;
}
