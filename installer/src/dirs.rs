//! Directory resolution for the installer.
//!
//! rime lives under a single install root, `~/.rime`, with the executable
//! in `~/.rime/bin` and the shell environment files beside it. The
//! [`BaseDirs`] trait keeps the home-directory lookup behind a seam so tests
//! can point the installer at a sandbox.

use std::path::PathBuf;

/// Name of the install root directory under the user's home.
pub const INSTALL_ROOT_NAME: &str = ".rime";

/// Name of the installer configuration file inside the install root.
pub const CONFIG_FILE_NAME: &str = "installer.toml";

/// Platform directory lookup.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// The current user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The install root, `~/.rime`.
    fn install_root(&self) -> Option<PathBuf> {
        self.home_dir().map(|home| home.join(INSTALL_ROOT_NAME))
    }

    /// The default bin directory, `~/.rime/bin`.
    fn bin_dir(&self) -> Option<PathBuf> {
        self.install_root().map(|root| root.join("bin"))
    }

    /// The default configuration file, `~/.rime/installer.toml`.
    fn config_file(&self) -> Option<PathBuf> {
        self.install_root().map(|root| root.join(CONFIG_FILE_NAME))
    }
}

/// [`BaseDirs`] backed by `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }
}

/// [`BaseDirs`] rooted at a fixed home directory.
///
/// # Examples
///
/// ```
/// use rime_installer::dirs::{BaseDirs, FixedHomeDirs};
/// use std::path::PathBuf;
///
/// let dirs = FixedHomeDirs::new("/home/ada");
/// assert_eq!(dirs.bin_dir(), Some(PathBuf::from("/home/ada/.rime/bin")));
/// ```
#[derive(Debug, Clone)]
pub struct FixedHomeDirs {
    home: PathBuf,
}

impl FixedHomeDirs {
    /// Resolve every directory relative to `home`.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }
}

impl BaseDirs for FixedHomeDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.home.clone())
    }
}
