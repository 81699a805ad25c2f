//! Shared test utilities for the installer crate.
//!
//! Builders for release archives, release tables, and stub `rime`
//! executables, used by unit tests and by the behaviour suites under
//! `tests/` through the `test-support` feature.

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::artefact::sha256_digest::Sha256Digest;

/// Build a gzip-compressed tarball holding `entries` as regular files.
///
/// Each entry is `(path, contents)` and is written with mode `0o755`.
///
/// # Panics
///
/// Panics if the in-memory archive cannot be written.
#[must_use]
#[expect(clippy::expect_used, reason = "fixture builders fail loudly")]
pub fn gzip_tar_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .expect("append tar entry");
    }
    builder
        .into_inner()
        .expect("finish tar stream")
        .finish()
        .expect("finish gzip stream")
}

/// Lower-case hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256Digest::of(bytes).into_inner()
}

/// A `/bin/sh` script that answers `--version` like a real `rime` release.
#[must_use]
pub fn stub_executable_script(version: &str) -> String {
    format!(
        concat!(
            "#!/bin/sh\n",
            "if [ \"$1\" = \"--version\" ]; then\n",
            "  echo \"rime version {version}\"\n",
            "fi\n",
        ),
        version = version
    )
}

/// A release archive holding a stub `rime` for `version`.
#[must_use]
pub fn stub_release_archive(version: &str) -> Vec<u8> {
    gzip_tar_archive(&[("rime", &stub_executable_script(version))])
}

/// Render a release table with one release per `(version, platform, sha256)`
/// row. URLs are left to be derived from the default repository.
#[must_use]
pub fn release_table_toml(rows: &[(&str, &str, &str)]) -> String {
    let mut text = String::new();
    let mut versions: Vec<&str> = Vec::new();
    for (version, _, _) in rows {
        if !versions.contains(version) {
            versions.push(version);
        }
    }
    for version in versions {
        text.push_str(&format!("[[release]]\nversion = \"{version}\"\n\n"));
        for (_, platform, sha256) in rows.iter().filter(|(v, _, _)| *v == version) {
            text.push_str(&format!(
                "[release.artifacts.{platform}]\nsha256 = \"{sha256}\"\n\n"
            ));
        }
    }
    text
}
