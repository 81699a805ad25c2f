//! Placing the executable into its bin directory.
//!
//! The executable is written to a temporary file beside its destination and
//! renamed into place, so a reinstall replaces the previous binary in one
//! step and an interrupted write never leaves a truncated `rime` behind.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::artefact::manifest::EXECUTABLE_NAME;
use crate::error::{InstallerError, Result};

/// Permission bits for the installed executable (rwxr-xr-x).
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Where an executable is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    bin_dir: Utf8PathBuf,
    executable_name: String,
}

impl InstallTarget {
    /// Target `bin_dir/executable_name`.
    #[must_use]
    pub fn new(bin_dir: impl Into<Utf8PathBuf>, executable_name: impl Into<String>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            executable_name: executable_name.into(),
        }
    }

    /// Target the `rime` executable in `bin_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rime_installer::install::InstallTarget;
    ///
    /// let target = InstallTarget::rime("/home/ada/.rime/bin");
    /// assert_eq!(target.executable_path().as_str(), "/home/ada/.rime/bin/rime");
    /// ```
    #[must_use]
    pub fn rime(bin_dir: impl Into<Utf8PathBuf>) -> Self {
        Self::new(bin_dir, EXECUTABLE_NAME)
    }

    /// The directory the executable lives in.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// The executable's file name.
    #[must_use]
    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    /// Full path of the installed executable.
    #[must_use]
    pub fn executable_path(&self) -> Utf8PathBuf {
        self.bin_dir.join(&self.executable_name)
    }
}

/// Write `contents` to the target as an executable, replacing any prior file.
///
/// The bin directory is created when missing.
///
/// # Errors
///
/// Returns [`InstallerError::FileSystem`] if the directory cannot be
/// created or the file cannot be written, made executable, or renamed into
/// place.
pub fn install(contents: &[u8], target: &InstallTarget) -> Result<Utf8PathBuf> {
    let bin_dir = target.bin_dir();
    std::fs::create_dir_all(bin_dir)
        .map_err(|e| InstallerError::file_system("create", bin_dir, &e))?;

    let destination = target.executable_path();
    let mut staged = tempfile::Builder::new()
        .prefix(&format!(".{}.", target.executable_name()))
        .tempfile_in(bin_dir)
        .map_err(|e| InstallerError::file_system("write", bin_dir, &e))?;
    staged
        .write_all(contents)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| InstallerError::file_system("write", &destination, &e))?;
    make_executable(staged.path())
        .map_err(|e| InstallerError::file_system("set permissions on", &destination, &e))?;
    staged
        .persist(&destination)
        .map_err(|e| InstallerError::file_system("replace", &destination, &e.error))?;

    log::info!("installed {} bytes to {destination}", contents.len());
    Ok(destination)
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(EXECUTABLE_MODE))
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}
