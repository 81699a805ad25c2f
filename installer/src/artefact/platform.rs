//! Operating system and CPU architecture model for release artefacts.
//!
//! Releases publish one archive per supported platform, keyed by an asset
//! name such as `darwin-arm64`. Only the three platforms rime publishes are
//! supported; other operating systems and architectures still parse so that
//! they can be named in error messages.

use super::error::{ArtefactError, Result};
use std::fmt;
use std::str::FromStr;

/// Asset keys for the supported platforms, in table order.
const SUPPORTED_ASSET_KEYS: &[&str] = &["darwin-arm64", "darwin-amd64", "linux-amd64"];

/// An operating system as named by release assets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
    /// Apple macOS (`darwin` in asset names).
    MacOs,
    /// Linux.
    Linux,
    /// Any other operating system, kept verbatim.
    Other(String),
}

impl Os {
    /// Return the asset-name spelling of this operating system.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MacOs => "darwin",
            Self::Linux => "linux",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for Os {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Ok(match normalised.as_str() {
            "darwin" | "macos" | "osx" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other(normalised),
        })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CPU architecture as named by release assets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    /// 64-bit ARM (`arm64`, also spelt `aarch64`).
    Arm64,
    /// 64-bit x86 (`amd64`, also spelt `x86_64`).
    Amd64,
    /// Any other architecture, kept verbatim.
    Other(String),
}

impl Arch {
    /// Return the asset-name spelling of this architecture.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Arm64 => "arm64",
            Self::Amd64 => "amd64",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for Arch {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Ok(match normalised.as_str() {
            "arm64" | "aarch64" => Self::Arm64,
            "amd64" | "x86_64" | "x64" => Self::Amd64,
            _ => Self::Other(normalised),
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `(Os, Arch)` pair.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::platform::{Arch, Os, Platform};
///
/// let platform = Platform::new(Os::MacOs, Arch::Arm64);
/// assert_eq!(platform.asset_key(), "darwin-arm64");
/// assert!(platform.is_supported());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform {
    os: Os,
    arch: Arch,
}

impl Platform {
    /// Create a platform from its parts.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Parse a platform from free-form OS and architecture names.
    ///
    /// Never fails: unknown names become [`Os::Other`] / [`Arch::Other`].
    #[must_use]
    pub fn from_names(os: &str, arch: &str) -> Self {
        let os = match os.parse::<Os>() {
            Ok(os) => os,
            Err(never) => match never {},
        };
        let arch = match arch.parse::<Arch>() {
            Ok(arch) => arch,
            Err(never) => match never {},
        };
        Self { os, arch }
    }

    /// Detect the platform this binary was compiled for.
    #[must_use]
    pub fn host() -> Self {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// The operating system.
    #[must_use]
    pub const fn os(&self) -> &Os {
        &self.os
    }

    /// The CPU architecture.
    #[must_use]
    pub const fn arch(&self) -> &Arch {
        &self.arch
    }

    /// Return the asset key, e.g. `linux-amd64`.
    #[must_use]
    pub fn asset_key(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }

    /// Whether rime publishes artefacts for this platform.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        SUPPORTED_ASSET_KEYS.contains(&self.asset_key().as_str())
    }

    /// Return every supported platform.
    #[must_use]
    pub fn supported() -> Vec<Self> {
        vec![
            Self::new(Os::MacOs, Arch::Arm64),
            Self::new(Os::MacOs, Arch::Amd64),
            Self::new(Os::Linux, Arch::Amd64),
        ]
    }

    /// Return the supported asset keys.
    #[must_use]
    pub fn supported_asset_keys() -> &'static [&'static str] {
        SUPPORTED_ASSET_KEYS
    }

    /// Parse a supported asset key such as `darwin-amd64`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidReleaseTable`] when the key is not one
    /// of the supported asset keys.
    pub fn from_asset_key(key: &str) -> Result<Self> {
        let platform = key
            .split_once('-')
            .map(|(os, arch)| Self::from_names(os, arch))
            .filter(|platform| platform.is_supported() && platform.asset_key() == key);
        platform.ok_or_else(|| ArtefactError::InvalidReleaseTable {
            reason: format!(
                "unknown platform key \"{key}\"; expected one of: {}",
                SUPPORTED_ASSET_KEYS.join(", ")
            ),
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
