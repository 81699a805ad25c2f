//! Installer configuration.
//!
//! Settings are layered, highest precedence first: command-line flags,
//! environment variables, the configuration file, then built-in defaults.
//! The configuration file is `--config FILE` when given, otherwise
//! `~/.rime/installer.toml` if it exists.
//!
//! ```toml
//! bin_dir = "/opt/rime/bin"
//! manifest = "/etc/rime/releases.toml"
//! timeout_secs = 60
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::artefact::download::DEFAULT_DOWNLOAD_TIMEOUT;
use crate::artefact::manifest::ReleaseTable;
use crate::artefact::manifest_parser::{bundled_release_table, parse_release_table};
use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};

/// Environment variable overriding the bin directory.
pub const INSTALL_DIR_ENV: &str = "RIME_INSTALL_DIR";

/// Environment variable naming an external release table.
pub const RELEASE_MANIFEST_ENV: &str = "RIME_RELEASE_MANIFEST";

/// Settings read from a configuration file or the environment.
///
/// Every field is optional; unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Directory the `rime` executable is installed into.
    pub bin_dir: Option<Utf8PathBuf>,
    /// Path to an external release table.
    pub manifest: Option<Utf8PathBuf>,
    /// Download timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one installer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Directory the `rime` executable is installed into.
    pub bin_dir: Utf8PathBuf,
    /// External release table, or `None` for the bundled one.
    pub manifest: Option<Utf8PathBuf>,
    /// Download timeout.
    pub timeout: Duration,
}

impl InstallerConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Configuration`] on malformed TOML or
    /// unknown keys.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| InstallerError::Configuration {
            reason: e.to_string(),
        })
    }

    /// Load the configuration file.
    ///
    /// An explicit `path` must exist. Without one, the default file under
    /// the install root is read when present and ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Configuration`] if the file cannot be read
    /// or parsed.
    pub fn load(path: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<Self> {
        let candidate = match path {
            Some(explicit) => explicit.to_owned(),
            None => match dirs.config_file().map(utf8_path).transpose()? {
                Some(default) if default.is_file() => default,
                _ => return Ok(Self::default()),
            },
        };
        log::debug!("reading configuration from {candidate}");
        let text =
            std::fs::read_to_string(&candidate).map_err(|e| InstallerError::Configuration {
                reason: format!("cannot read {candidate}: {e}"),
            })?;
        Self::from_toml(&text).map_err(|err| match err {
            InstallerError::Configuration { reason } => InstallerError::Configuration {
                reason: format!("{candidate}: {reason}"),
            },
            other => other,
        })
    }

    /// Settings taken from `RIME_INSTALL_DIR` and `RIME_RELEASE_MANIFEST`.
    ///
    /// Empty variables count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bin_dir: env_path(INSTALL_DIR_ENV),
            manifest: env_path(RELEASE_MANIFEST_ENV),
            timeout_secs: None,
        }
    }

    /// Overlay `higher` onto `self`; fields set in `higher` win.
    #[must_use]
    pub fn overlay(self, higher: Self) -> Self {
        Self {
            bin_dir: higher.bin_dir.or(self.bin_dir),
            manifest: higher.manifest.or(self.manifest),
            timeout_secs: higher.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Fill remaining gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Configuration`] when no bin directory is
    /// configured and the home directory cannot be determined, or when the
    /// timeout is zero.
    pub fn resolve(self, dirs: &dyn BaseDirs) -> Result<ResolvedConfig> {
        let bin_dir = match self.bin_dir {
            Some(dir) => dir,
            None => dirs
                .bin_dir()
                .map(utf8_path)
                .transpose()?
                .ok_or_else(|| InstallerError::Configuration {
                    reason: "cannot determine home directory; pass --bin-dir".to_owned(),
                })?,
        };
        let timeout = match self.timeout_secs {
            Some(0) => {
                return Err(InstallerError::Configuration {
                    reason: "timeout must be at least one second".to_owned(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_DOWNLOAD_TIMEOUT,
        };
        Ok(ResolvedConfig {
            bin_dir,
            manifest: self.manifest,
            timeout,
        })
    }
}

/// Resolve settings from every layer.
///
/// `cli` holds the command-line flags; `config_path` is `--config`.
///
/// # Errors
///
/// Propagates errors from [`InstallerConfig::load`] and
/// [`InstallerConfig::resolve`].
pub fn resolve_config(
    cli: InstallerConfig,
    config_path: Option<&Utf8Path>,
    dirs: &dyn BaseDirs,
) -> Result<ResolvedConfig> {
    InstallerConfig::load(config_path, dirs)?
        .overlay(InstallerConfig::from_env())
        .overlay(cli)
        .resolve(dirs)
}

/// Read and parse the release table at `path`.
///
/// # Errors
///
/// Returns [`InstallerError::Configuration`] if the file cannot be read and
/// [`InstallerError::Artefact`] if it is not a valid release table.
pub fn load_release_table(path: &Utf8Path) -> Result<ReleaseTable> {
    log::debug!("loading release table from {path}");
    let text = std::fs::read_to_string(path).map_err(|e| InstallerError::Configuration {
        reason: format!("cannot read release table {path}: {e}"),
    })?;
    Ok(parse_release_table(&text)?)
}

/// The external release table when one is configured, else the bundled one.
///
/// # Errors
///
/// See [`load_release_table`] and [`bundled_release_table`].
pub fn release_table(manifest: Option<&Utf8Path>) -> Result<ReleaseTable> {
    match manifest {
        Some(path) => load_release_table(path),
        None => Ok(bundled_release_table()?),
    }
}

fn env_path(name: &str) -> Option<Utf8PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Utf8PathBuf::from)
}

fn utf8_path(path: std::path::PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| InstallerError::Configuration {
        reason: format!("path is not valid UTF-8: {}", path.display()),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
