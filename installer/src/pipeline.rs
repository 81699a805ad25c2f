//! Install pipeline orchestration.
//!
//! Runs the stages in order: resolve the artefact for the requested
//! release and platform, download it, verify its checksum, extract the
//! executable, install it, then smoke-test the result. Each stage only runs
//! once the previous one succeeded, so a checksum mismatch never touches the
//! install target.
//!
//! Unlike earlier stages, a failed smoke test leaves the freshly installed
//! binary in place; the failure is still reported to the caller.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};

use crate::artefact::download::{ArtefactDownloader, HttpDownloader};
use crate::artefact::extraction::{ArtefactExtractor, GzipTarExtractor};
use crate::artefact::manifest::{
    ArtifactDescriptor, EXECUTABLE_NAME, ReleaseManifest, ReleaseTable,
};
use crate::artefact::platform::Platform;
use crate::artefact::verification::verify_checksum;
use crate::error::{InstallFailure, InstallerError};
use crate::install::{InstallTarget, install};
use crate::output::write_stderr_line;
use crate::smoke::check_install;

/// What to install and where.
#[derive(Debug, Clone)]
pub struct InstallRequest<'a> {
    /// Version to install; `None` selects the newest release.
    pub version: Option<&'a str>,
    /// Platform whose artefact is installed.
    pub platform: Platform,
    /// Directory the executable is installed into.
    pub bin_dir: &'a Utf8Path,
    /// When true, the `--version` smoke test is skipped.
    pub skip_verify: bool,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// A completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// The installed version.
    pub version: String,
    /// The platform the artefact was built for.
    pub platform: Platform,
    /// Path of the installed executable.
    pub executable: Utf8PathBuf,
    /// Whether the smoke test ran (and passed).
    pub verified: bool,
}

/// The release and artefact an install request resolves to.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedArtefact<'t> {
    /// The selected release.
    pub manifest: &'t ReleaseManifest,
    /// The selected platform artefact.
    pub descriptor: &'t ArtifactDescriptor,
}

/// Select the release and platform artefact for `request`.
///
/// Without an explicit version, the newest release that publishes an
/// artefact for the requested platform is chosen.
///
/// # Errors
///
/// Returns [`InstallFailure`] with kind `UnknownVersion` or
/// `UnsupportedPlatform` when the lookup fails. Once a release has been
/// selected, the failure names that release's version.
pub fn resolve_request<'t>(
    table: &'t ReleaseTable,
    request: &InstallRequest<'_>,
) -> Result<ResolvedArtefact<'t>, InstallFailure> {
    let platform_key = request.platform.asset_key();
    let fail = |version: &str, err: InstallerError| {
        InstallFailure::new(version, platform_key.as_str(), err)
    };

    let manifest = match request.version {
        Some(version) => table.get(version).map_err(|e| fail(version, e.into()))?,
        None => table.latest_for(&request.platform).ok_or_else(|| {
            fail(
                "latest",
                InstallerError::Configuration {
                    reason: "release table is empty".to_owned(),
                },
            )
        })?,
    };
    let descriptor = manifest
        .resolve(&request.platform)
        .map_err(|e| fail(manifest.version().as_str(), e.into()))?;
    log::debug!(
        "resolved rime {} for {} to {}",
        manifest.version(),
        request.platform,
        descriptor.url()
    );
    Ok(ResolvedArtefact {
        manifest,
        descriptor,
    })
}

/// Install using the production HTTP downloader and archive extractor.
///
/// # Errors
///
/// See [`run_install_with`].
pub fn run_install(
    table: &ReleaseTable,
    request: &InstallRequest<'_>,
    timeout: Duration,
    stderr: &mut dyn Write,
) -> Result<InstallReport, InstallFailure> {
    run_install_with(
        table,
        request,
        &HttpDownloader::with_timeout(timeout),
        &GzipTarExtractor,
        stderr,
    )
}

/// Testable inner function with injected dependencies.
///
/// The production entry point [`run_install`] delegates here with real
/// implementations; tests inject mocks.
///
/// # Errors
///
/// Returns [`InstallFailure`] naming the stage's [`ErrorKind`] plus the
/// version and platform that were being installed.
///
/// [`ErrorKind`]: crate::error::ErrorKind
pub fn run_install_with(
    table: &ReleaseTable,
    request: &InstallRequest<'_>,
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn ArtefactExtractor,
    stderr: &mut dyn Write,
) -> Result<InstallReport, InstallFailure> {
    let resolved = resolve_request(table, request)?;
    let version = resolved.manifest.version().as_str();
    let target = InstallTarget::new(request.bin_dir, EXECUTABLE_NAME);

    let executable = run_stages(
        resolved.descriptor,
        &target,
        downloader,
        extractor,
        request.quiet,
        stderr,
    )
    .map_err(|err| InstallFailure::new(version, request.platform.asset_key(), err))?;

    if request.skip_verify {
        log::debug!("smoke test skipped");
    } else {
        if !request.quiet {
            write_stderr_line(stderr, format!("Verifying {executable} --version..."));
        }
        check_install(&target, version).map_err(|err| {
            log::warn!("smoke test failed: {err}");
            InstallFailure::new(version, request.platform.asset_key(), err)
        })?;
    }

    Ok(InstallReport {
        version: version.to_owned(),
        platform: request.platform.clone(),
        executable,
        verified: !request.skip_verify,
    })
}

/// The core stages: download → verify → extract → install.
fn run_stages(
    descriptor: &ArtifactDescriptor,
    target: &InstallTarget,
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn ArtefactExtractor,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<Utf8PathBuf, InstallerError> {
    if !quiet {
        write_stderr_line(stderr, format!("Downloading {}...", descriptor.url()));
    }
    let archive = downloader.download(descriptor.url())?;

    verify_checksum(&archive, descriptor.sha256())?;
    log::debug!("checksum verified: {}", descriptor.sha256());

    let executable = extractor.extract_executable(&archive, target.executable_name())?;

    if !quiet {
        write_stderr_line(stderr, format!("Installing to {}...", target.executable_path()));
    }
    install(&executable, target)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
