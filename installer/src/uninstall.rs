//! Removing an installed rime.
//!
//! Uninstall is planned before anything is touched: the plan lists the
//! shell profiles whose rime source lines will be dropped and the files or
//! directories that will be deleted. The caller shows the plan, asks for
//! confirmation, then executes it action by action.
//!
//! Installs managed by Homebrew are refused; Homebrew must remove its own
//! files.

use std::fmt;
use std::io::{BufRead, Write};

use camino::{Utf8Path, Utf8PathBuf};

use crate::artefact::manifest::EXECUTABLE_NAME;
use crate::dirs::INSTALL_ROOT_NAME;
use crate::error::{InstallerError, Result};
use crate::output::write_stderr_line;
use crate::shell_env::{
    ENV_FISH_FILE, ENV_SH_FILE, PROFILE_FILES, install_root_for, strip_source_lines,
};

/// Path fragments that identify a Homebrew-managed install.
const HOMEBREW_MARKERS: &[&str] = &[
    "/Cellar/",
    "/homebrew/",
    "/opt/homebrew/",
    "/usr/local/opt/",
];

/// One step of an uninstall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallAction {
    /// Rewrite a shell profile without its rime source lines.
    StripProfile {
        /// The profile file.
        path: Utf8PathBuf,
        /// The profile contents after stripping.
        contents: String,
    },
    /// Delete a single file.
    RemoveFile {
        /// The file to delete.
        path: Utf8PathBuf,
    },
    /// Delete a directory and everything in it.
    RemoveDir {
        /// The directory to delete.
        path: Utf8PathBuf,
    },
}

impl fmt::Display for UninstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StripProfile { path, .. } => write!(f, "Remove rime lines from {path}"),
            Self::RemoveFile { path } => write!(f, "Delete {path}"),
            Self::RemoveDir { path } => write!(f, "Delete directory {path}"),
        }
    }
}

impl UninstallAction {
    fn execute(&self) -> Result<()> {
        match self {
            Self::StripProfile { path, contents } => std::fs::write(path, contents)
                .map_err(|e| InstallerError::file_system("write", path, &e)),
            Self::RemoveFile { path } => std::fs::remove_file(path)
                .map_err(|e| InstallerError::file_system("remove", path, &e)),
            Self::RemoveDir { path } => std::fs::remove_dir_all(path)
                .map_err(|e| InstallerError::file_system("remove", path, &e)),
        }
    }
}

/// An ordered list of uninstall actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallPlan {
    actions: Vec<UninstallAction>,
}

impl UninstallPlan {
    /// The planned actions, in execution order.
    #[must_use]
    pub fn actions(&self) -> &[UninstallAction] {
        &self.actions
    }

    /// Whether there is nothing to remove.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Execute every action in order, reporting each one.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failing action.
    pub fn execute(&self, stderr: &mut dyn Write) -> Result<()> {
        for action in &self.actions {
            action.execute()?;
            log::info!("{action}");
            write_stderr_line(stderr, format!("  done: {action}"));
        }
        Ok(())
    }
}

/// Whether `path` lies inside a Homebrew prefix.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use rime_installer::uninstall::is_homebrew_path;
///
/// assert!(is_homebrew_path(Utf8Path::new("/opt/homebrew/bin/rime")));
/// assert!(!is_homebrew_path(Utf8Path::new("/home/ada/.rime/bin/rime")));
/// ```
#[must_use]
pub fn is_homebrew_path(path: &Utf8Path) -> bool {
    HOMEBREW_MARKERS
        .iter()
        .any(|marker| path.as_str().contains(marker))
}

/// Plan the removal of the rime installed in `bin_dir`.
///
/// Profiles under `home` that source rime's environment files are
/// rewritten. When the install root is a dedicated `.rime` directory it is
/// removed whole; otherwise only the executable and environment files are.
///
/// # Errors
///
/// Returns [`InstallerError::HomebrewManaged`] when the executable resolves
/// into a Homebrew prefix and [`InstallerError::FileSystem`] when a profile
/// cannot be read.
pub fn plan_uninstall(home: &Utf8Path, bin_dir: &Utf8Path) -> Result<UninstallPlan> {
    let executable = bin_dir.join(EXECUTABLE_NAME);
    let resolved = executable
        .canonicalize_utf8()
        .unwrap_or_else(|_| executable.clone());
    if is_homebrew_path(&resolved) {
        return Err(InstallerError::HomebrewManaged { path: resolved });
    }

    let install_root = install_root_for(bin_dir);
    let mut actions = Vec::new();

    for profile in PROFILE_FILES {
        let path = home.join(profile);
        if !path.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| InstallerError::file_system("read", &path, &e))?;
        if let Some(contents) = strip_source_lines(&text, &install_root) {
            actions.push(UninstallAction::StripProfile { path, contents });
        }
    }

    if install_root.file_name() == Some(INSTALL_ROOT_NAME) && install_root.is_dir() {
        actions.push(UninstallAction::RemoveDir { path: install_root });
    } else {
        let candidates = [
            executable,
            install_root.join(ENV_SH_FILE),
            install_root.join(ENV_FISH_FILE),
        ];
        actions.extend(
            candidates
                .into_iter()
                .filter(|path| path.is_file())
                .map(|path| UninstallAction::RemoveFile { path }),
        );
    }

    Ok(UninstallPlan { actions })
}

/// Ask `prompt` and read a yes/no answer; anything but `y`/`yes` is no.
pub fn confirm(prompt: &str, input: &mut dyn BufRead, stderr: &mut dyn Write) -> bool {
    if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Show `plan`, confirm unless `assume_yes`, then execute it.
///
/// Returns whether the plan was executed.
///
/// # Errors
///
/// Propagates the first failing action from [`UninstallPlan::execute`].
pub fn run_uninstall(
    plan: &UninstallPlan,
    assume_yes: bool,
    input: &mut dyn BufRead,
    stderr: &mut dyn Write,
) -> Result<bool> {
    if plan.is_empty() {
        write_stderr_line(stderr, "Nothing to remove.");
        return Ok(false);
    }

    write_stderr_line(stderr, "The following will be removed:");
    for action in plan.actions() {
        write_stderr_line(stderr, format!("  {action}"));
    }

    if !assume_yes && !confirm("Continue?", input, stderr) {
        write_stderr_line(stderr, "Aborted.");
        return Ok(false);
    }

    plan.execute(stderr)?;
    write_stderr_line(stderr, "rime has been uninstalled.");
    Ok(true)
}

#[cfg(test)]
#[path = "uninstall_tests.rs"]
mod tests;
