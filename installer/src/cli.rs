//! CLI argument definitions for the rime installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::artefact::platform::Platform;
use crate::config::InstallerConfig;

/// Install the rime CLI from a prebuilt release.
#[derive(Parser, Debug)]
#[command(name = "rime-installer")]
#[command(version, about, args_conflicts_with_subcommands = true)]
#[command(long_about = concat!(
    "Install the rime CLI from a prebuilt release.\n\n",
    "The installer picks the release archive for your operating system and CPU ",
    "architecture, checks its SHA-256 digest against the release table, and ",
    "places the `rime` executable in a bin directory (~/.rime/bin by default). ",
    "It then runs `rime --version` to confirm the install.\n\n",
    "Supported platforms: darwin-arm64, darwin-amd64, linux-amd64.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  RIME_INSTALL_DIR         Bin directory (overridden by --bin-dir)\n",
    "  RIME_RELEASE_MANIFEST    Release table file (overridden by --manifest)\n",
    "  RUST_LOG                 Log filter, e.g. rime_installer=debug\n\n",
    "EXAMPLES:\n",
    "  Install the latest release:\n",
    "    $ rime-installer\n\n",
    "  Install a specific release into a custom directory:\n",
    "    $ rime-installer install 0.1.1 --bin-dir ~/bin\n\n",
    "  List known releases:\n",
    "    $ rime-installer list\n\n",
    "  Check the installed binary:\n",
    "    $ rime-installer verify 0.2.0\n\n",
    "  Remove rime:\n",
    "    $ rime-installer uninstall\n\n",
    "For more information, see: https://github.com/rimelabs/rime-cli",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install rime (default when no subcommand given).
    Install(InstallArgs),

    /// List releases in the release table.
    List(ListArgs),

    /// Check that the installed rime reports the expected version.
    Verify(VerifyArgs),

    /// Remove rime and its shell profile lines.
    Uninstall(UninstallArgs),
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Release to install [default: newest release for the platform].
    #[arg(value_name = "VERSION")]
    pub release: Option<String>,

    /// Override the detected operating system (e.g. macos, linux).
    #[arg(long, value_name = "OS")]
    pub os: Option<String>,

    /// Override the detected CPU architecture (e.g. arm64, amd64).
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Directory to install rime into [default: ~/.rime/bin].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Release table file [default: bundled table].
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// Installer configuration file [default: ~/.rime/installer.toml].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Download timeout in seconds [default: 30].
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the `rime --version` check after installing.
    #[arg(long)]
    pub skip_verify: bool,

    /// Skip writing env.sh and env.fish.
    #[arg(long)]
    pub skip_env: bool,

    /// Show what would be installed and exit without downloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Arguments for the list command.
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {
    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,

    /// Release table file [default: bundled table].
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// Installer configuration file [default: ~/.rime/installer.toml].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

/// Arguments for the verify command.
#[derive(Parser, Debug, Clone, Default)]
pub struct VerifyArgs {
    /// Expected version [default: newest release for this host].
    #[arg(value_name = "VERSION")]
    pub release: Option<String>,

    /// Directory rime was installed into [default: ~/.rime/bin].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Release table file used to find the newest version.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// Installer configuration file [default: ~/.rime/installer.toml].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

/// Arguments for the uninstall command.
#[derive(Parser, Debug, Clone, Default)]
pub struct UninstallArgs {
    /// Do not ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,

    /// Directory rime was installed into [default: ~/.rime/bin].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Installer configuration file [default: ~/.rime/installer.toml].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

impl InstallArgs {
    /// The platform to install for: the host, with `--os`/`--arch` applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use rime_installer::cli::InstallArgs;
    ///
    /// let args = InstallArgs {
    ///     os: Some("macos".to_owned()),
    ///     arch: Some("aarch64".to_owned()),
    ///     ..InstallArgs::default()
    /// };
    /// assert_eq!(args.platform().asset_key(), "darwin-arm64");
    /// ```
    #[must_use]
    pub fn platform(&self) -> Platform {
        let host = Platform::host();
        Platform::from_names(
            self.os.as_deref().unwrap_or_else(|| host.os().as_str()),
            self.arch.as_deref().unwrap_or_else(|| host.arch().as_str()),
        )
    }

    /// The configuration layer contributed by command-line flags.
    #[must_use]
    pub fn config_overrides(&self) -> InstallerConfig {
        InstallerConfig {
            bin_dir: self.bin_dir.clone(),
            manifest: self.manifest.clone(),
            timeout_secs: self.timeout,
        }
    }
}

impl Cli {
    /// Returns the effective install arguments.
    ///
    /// If an `Install` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened install arguments.
    ///
    /// # Note
    ///
    /// When another subcommand is active, this returns the default
    /// flattened install arguments. Callers should check `self.command`
    /// first.
    #[must_use]
    pub fn install_args(&self) -> &InstallArgs {
        match &self.command {
            Some(Command::Install(args)) => args,
            Some(Command::List(_) | Command::Verify(_) | Command::Uninstall(_)) | None => {
                &self.install
            }
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
