//! Output formatting for the installer CLI.
//!
//! Progress and results go to stderr one line at a time. This module holds
//! the line writer together with the messages that need more than one
//! `format!`: shell profile snippets, PATH instructions, and the dry-run
//! summary.

use std::io::Write;

use camino::Utf8Path;

use crate::shell_env::{ENV_FISH_FILE, ENV_SH_FILE, PROFILE_MARKER};

/// Write `message` and a newline, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; a closed stderr is not worth failing over.
    }
}

/// Lines that source the rime environment files from a shell profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSnippet {
    /// Source line for sh, bash and zsh.
    pub posix: String,
    /// Source line for fish.
    pub fish: String,
}

impl ShellSnippet {
    /// Create source lines for the environment files under `install_root`.
    ///
    /// # Example
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use rime_installer::output::ShellSnippet;
    ///
    /// let snippet = ShellSnippet::new(Utf8Path::new("/home/ada/.rime"));
    /// assert_eq!(snippet.posix, ". \"/home/ada/.rime/env.sh\"");
    /// assert_eq!(snippet.fish, "source \"/home/ada/.rime/env.fish\"");
    /// ```
    #[must_use]
    pub fn new(install_root: &Utf8Path) -> Self {
        Self {
            posix: format!(". \"{}\"", install_root.join(ENV_SH_FILE)),
            fish: format!("source \"{}\"", install_root.join(ENV_FISH_FILE)),
        }
    }

    /// Format the snippet for display to the user.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!(
            concat!(
                "To use rime in new shells, add the following to your shell configuration:\n\n",
                "  # bash/zsh (~/.bashrc, ~/.bash_profile, ~/.zshrc)\n",
                "  {marker}\n",
                "  {posix}\n\n",
                "  # fish (~/.config/fish/config.fish)\n",
                "  {marker}\n",
                "  {fish}"
            ),
            marker = PROFILE_MARKER,
            posix = self.posix,
            fish = self.fish
        )
    }
}

/// Format a success message after installation.
#[must_use]
pub fn success_message(version: &str, executable: &Utf8Path) -> String {
    format!("Installed rime {version} to {executable}")
}

/// Returns instructions for adding a directory to PATH.
#[must_use]
pub fn path_instructions(bin_dir: &Utf8Path) -> String {
    format!(
        concat!(
            "{bin_dir} is not on your PATH. For the current shell, run:\n",
            "  export PATH=\"{bin_dir}:$PATH\""
        ),
        bin_dir = bin_dir
    )
}

/// Checks if a directory is in the PATH environment variable.
#[must_use]
pub fn is_directory_in_path(dir: &Utf8Path) -> bool {
    std::env::var_os("PATH")
        .is_some_and(|path| std::env::split_paths(&path).any(|p| p == dir.as_std_path()))
}

/// Configuration information for dry-run output.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use rime_installer::output::DryRunInfo;
///
/// let info = DryRunInfo {
///     version: "0.2.0",
///     platform: "darwin-arm64",
///     url: "https://github.com/rimelabs/rime-cli/releases/download/v0.2.0/rime-darwin-arm64.tar.gz",
///     sha256: "b3d35f8c126dc1282c8a1d09b002db7b09ee9be044d1cc75348a6f898e26410a",
///     executable: Utf8Path::new("/home/ada/.rime/bin/rime"),
///     skip_verify: false,
///     skip_env: false,
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("darwin-arm64"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Version that would be installed.
    pub version: &'a str,
    /// Platform asset key.
    pub platform: &'a str,
    /// Archive URL.
    pub url: &'a str,
    /// Expected archive digest.
    pub sha256: &'a str,
    /// Where the executable would be written.
    pub executable: &'a Utf8Path,
    /// Whether the smoke test is skipped.
    pub skip_verify: bool,
    /// Whether environment files are skipped.
    pub skip_env: bool,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Version: {}", self.version),
            format!("Platform: {}", self.platform),
            format!("Archive: {}", self.url),
            format!("SHA-256: {}", self.sha256),
            format!("Install to: {}", self.executable),
            format!("Skip verify: {}", self.skip_verify),
            format!("Skip env: {}", self.skip_env),
        ]
        .join("\n")
    }
}
