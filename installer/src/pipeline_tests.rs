//! Unit tests for install pipeline orchestration.

use super::*;
use crate::artefact::download::{DownloadError, MockArtefactDownloader};
use crate::artefact::extraction::{ExtractionError, MockArtefactExtractor};
use crate::artefact::manifest_parser::parse_release_table;
use crate::artefact::platform::{Arch, Os};
use crate::error::ErrorKind;
use crate::test_utils::{release_table_toml, sha256_hex, stub_executable_script};
use rstest::rstest;

const FAKE_ARCHIVE: &[u8] = b"fake archive content";
const LINUX_URL: &str =
    "https://github.com/rimelabs/rime-cli/releases/download/v0.3.0/rime-linux-amd64.tar.gz";

fn linux() -> Platform {
    Platform::new(Os::Linux, Arch::Amd64)
}

fn table_for(archive: &[u8]) -> ReleaseTable {
    let digest = sha256_hex(archive);
    let text = release_table_toml(&[
        ("0.3.0", "linux-amd64", &digest),
        ("0.2.0", "linux-amd64", &digest),
        ("0.2.0", "darwin-arm64", &digest),
    ]);
    parse_release_table(&text).expect("valid table")
}

fn bin_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::try_from(temp.path().join("bin")).expect("UTF-8 path");
    (temp, path)
}

fn request(bin_dir: &Utf8Path) -> InstallRequest<'_> {
    InstallRequest {
        version: None,
        platform: linux(),
        bin_dir,
        skip_verify: true,
        quiet: true,
    }
}

fn serving(bytes: &'static [u8]) -> MockArtefactDownloader {
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_download()
        .returning(move |_| Ok(bytes.to_vec()));
    downloader
}

fn extracting(contents: &'static [u8]) -> MockArtefactExtractor {
    let mut extractor = MockArtefactExtractor::new();
    extractor
        .expect_extract_executable()
        .returning(move |_, _| Ok(contents.to_vec()));
    extractor
}

#[test]
fn happy_path_installs_latest_release() {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);

    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_download()
        .withf(|url| url == LINUX_URL)
        .times(1)
        .returning(|_| Ok(FAKE_ARCHIVE.to_vec()));
    let mut extractor = MockArtefactExtractor::new();
    extractor
        .expect_extract_executable()
        .withf(|archive, name| archive == FAKE_ARCHIVE && name == "rime")
        .times(1)
        .returning(|_, _| Ok(b"binary".to_vec()));

    let mut stderr = Vec::new();
    let report = run_install_with(&table, &request(&bin), &downloader, &extractor, &mut stderr)
        .expect("install succeeds");

    assert_eq!(report.version, "0.3.0");
    assert_eq!(report.executable, bin.join("rime"));
    assert!(!report.verified);
    assert_eq!(std::fs::read(bin.join("rime")).expect("read"), b"binary");
    assert!(stderr.is_empty(), "quiet mode must not print");
}

#[test]
fn explicit_version_is_honoured() {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_download()
        .withf(|url| url.contains("/v0.2.0/"))
        .returning(|_| Ok(FAKE_ARCHIVE.to_vec()));

    let req = InstallRequest {
        version: Some("v0.2.0"),
        ..request(&bin)
    };
    let report = run_install_with(
        &table,
        &req,
        &downloader,
        &extracting(b"bin"),
        &mut Vec::new(),
    )
    .expect("install succeeds");

    assert_eq!(report.version, "0.2.0");
}

#[test]
fn checksum_mismatch_never_writes() {
    let (_temp, bin) = bin_dir();
    let table = table_for(b"the published archive");

    let mut extractor = MockArtefactExtractor::new();
    extractor.expect_extract_executable().never();

    let failure = run_install_with(
        &table,
        &request(&bin),
        &serving(b"a tampered archive"),
        &extractor,
        &mut Vec::new(),
    )
    .expect_err("checksum mismatch");

    assert_eq!(failure.kind, ErrorKind::ChecksumMismatch);
    assert_eq!(failure.version, "0.3.0");
    assert_eq!(failure.platform, "linux-amd64");
    assert!(!bin.exists(), "bin dir must not be created");
}

#[test]
fn unknown_version_fails_before_download() {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_download().never();

    let req = InstallRequest {
        version: Some("9.9.9"),
        ..request(&bin)
    };
    let failure = run_install_with(&table, &req, &downloader, &extracting(b""), &mut Vec::new())
        .expect_err("unknown version");

    assert_eq!(failure.kind, ErrorKind::UnknownVersion);
    assert!(failure.to_string().contains("0.3.0, 0.2.0"));
}

#[rstest]
#[case::linux_arm64(Platform::new(Os::Linux, Arch::Arm64))]
#[case::windows(Platform::from_names("windows", "x86_64"))]
#[case::darwin_amd64_in_no_release(Platform::new(Os::MacOs, Arch::Amd64))]
fn unsupported_platform_fails_before_download(#[case] platform: Platform) {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_download().never();

    let req = InstallRequest {
        platform,
        ..request(&bin)
    };
    let failure = run_install_with(&table, &req, &downloader, &extracting(b""), &mut Vec::new())
        .expect_err("unsupported platform");

    assert_eq!(failure.kind, ErrorKind::UnsupportedPlatform);
}

#[test]
fn latest_install_skips_releases_missing_the_platform() {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);
    let req = InstallRequest {
        platform: Platform::new(Os::MacOs, Arch::Arm64),
        ..request(&bin)
    };

    let resolved = resolve_request(&table, &req).expect("0.2.0 publishes darwin-arm64");

    assert_eq!(resolved.manifest.version().as_str(), "0.2.0");
}

#[test]
fn bundled_table_resolves_latest_for_each_published_platform() {
    let table = crate::artefact::manifest_parser::bundled_release_table().expect("bundled table");
    let bin = Utf8PathBuf::from("/unused/bin");
    for (platform, expected) in [
        (Platform::new(Os::Linux, Arch::Amd64), "0.1.1"),
        (Platform::new(Os::MacOs, Arch::Arm64), "0.2.0"),
    ] {
        let req = InstallRequest {
            platform,
            ..request(&bin)
        };
        let resolved = resolve_request(&table, &req).expect("published platform resolves");
        assert_eq!(resolved.manifest.version().as_str(), expected);
    }
}

#[test]
fn failure_names_the_release_that_was_tried() {
    let table = table_for(FAKE_ARCHIVE);
    let bin = Utf8PathBuf::from("/unused/bin");
    let req = InstallRequest {
        platform: Platform::new(Os::MacOs, Arch::Amd64),
        ..request(&bin)
    };

    let failure = resolve_request(&table, &req).expect_err("no release publishes darwin-amd64");

    assert_eq!(failure.kind, ErrorKind::UnsupportedPlatform);
    assert_eq!(failure.version, "0.3.0");
    assert_eq!(failure.platform, "darwin-amd64");
}

#[test]
fn explicit_version_without_the_platform_is_unsupported() {
    let table = table_for(FAKE_ARCHIVE);
    let bin = Utf8PathBuf::from("/unused/bin");
    let req = InstallRequest {
        version: Some("v0.3.0"),
        platform: Platform::new(Os::MacOs, Arch::Arm64),
        ..request(&bin)
    };

    let failure = resolve_request(&table, &req).expect_err("0.3.0 lacks darwin-arm64");

    assert_eq!(failure.kind, ErrorKind::UnsupportedPlatform);
    assert_eq!(failure.version, "0.3.0");
}

#[rstest]
#[case::network(
    DownloadError::Network { url: LINUX_URL.to_owned(), reason: "timed out".to_owned() },
    ErrorKind::NetworkError
)]
#[case::status(
    DownloadError::HttpStatus { url: LINUX_URL.to_owned(), status: 404 },
    ErrorKind::HttpStatusError
)]
fn download_failures_are_classified(#[case] error: DownloadError, #[case] expected: ErrorKind) {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);
    let mut downloader = MockArtefactDownloader::new();
    let mut error = Some(error);
    downloader.expect_download().times(1).returning(move |_| {
        Err(error.take().unwrap_or(DownloadError::HttpStatus {
            url: String::new(),
            status: 500,
        }))
    });

    let failure = run_install_with(
        &table,
        &request(&bin),
        &downloader,
        &extracting(b""),
        &mut Vec::new(),
    )
    .expect_err("download failure");

    assert_eq!(failure.kind, expected);
    assert!(!bin.exists());
}

#[test]
fn archive_errors_are_classified() {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);
    let mut extractor = MockArtefactExtractor::new();
    extractor.expect_extract_executable().returning(|_, name| {
        Err(ExtractionError::EntryNotFound {
            name: name.to_owned(),
        })
    });

    let failure = run_install_with(
        &table,
        &request(&bin),
        &serving(FAKE_ARCHIVE),
        &extractor,
        &mut Vec::new(),
    )
    .expect_err("archive error");

    assert_eq!(failure.kind, ErrorKind::ArchiveError);
}

#[test]
fn progress_is_reported_when_not_quiet() {
    let (_temp, bin) = bin_dir();
    let table = table_for(FAKE_ARCHIVE);
    let req = InstallRequest {
        quiet: false,
        ..request(&bin)
    };

    let mut stderr = Vec::new();
    run_install_with(
        &table,
        &req,
        &serving(FAKE_ARCHIVE),
        &extracting(b"bin"),
        &mut stderr,
    )
    .expect("install succeeds");

    let text = String::from_utf8(stderr).expect("utf8");
    assert!(text.contains(&format!("Downloading {LINUX_URL}...")));
    assert!(text.contains("Installing to"));
}

#[cfg(unix)]
mod smoke {
    use super::*;

    fn stub_for(version: &str) -> &'static [u8] {
        Box::leak(stub_executable_script(version).into_bytes().into_boxed_slice())
    }

    #[test]
    fn smoke_test_passes_for_matching_stub() {
        let (_temp, bin) = bin_dir();
        let table = table_for(FAKE_ARCHIVE);
        let req = InstallRequest {
            skip_verify: false,
            ..request(&bin)
        };

        let report = run_install_with(
            &table,
            &req,
            &serving(FAKE_ARCHIVE),
            &extracting(stub_for("0.3.0")),
            &mut Vec::new(),
        )
        .expect("install succeeds");

        assert!(report.verified);
    }

    #[test]
    fn failed_smoke_test_keeps_the_binary() {
        let (_temp, bin) = bin_dir();
        let table = table_for(FAKE_ARCHIVE);
        let req = InstallRequest {
            skip_verify: false,
            ..request(&bin)
        };

        let failure = run_install_with(
            &table,
            &req,
            &serving(FAKE_ARCHIVE),
            &extracting(stub_for("0.1.1")),
            &mut Vec::new(),
        )
        .expect_err("smoke test fails");

        assert_eq!(failure.kind, ErrorKind::VerificationFailed);
        assert!(bin.join("rime").is_file(), "no rollback on smoke failure");
    }
}
