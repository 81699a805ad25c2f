//! Shell environment files.
//!
//! The install root carries `env.sh` and `env.fish`, which prepend the bin
//! directory to `PATH` when sourced. Users add a marked source line to their
//! shell profile; uninstall looks for that marker to take the line out again.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{InstallerError, Result};
use crate::output::ShellSnippet;

/// POSIX shell environment file name.
pub const ENV_SH_FILE: &str = "env.sh";

/// fish environment file name.
pub const ENV_FISH_FILE: &str = "env.fish";

/// Comment line that precedes the source line in a shell profile.
pub const PROFILE_MARKER: &str = "# rime";

/// Shell profiles that may source the environment files, relative to home.
pub const PROFILE_FILES: &[&str] = &[
    ".zshrc",
    ".bash_profile",
    ".bashrc",
    ".config/fish/config.fish",
];

/// Paths of the written environment files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFiles {
    /// The POSIX shell file.
    pub sh: Utf8PathBuf,
    /// The fish file.
    pub fish: Utf8PathBuf,
}

/// The install root for `bin_dir`: its parent, or `bin_dir` itself at `/`.
#[must_use]
pub fn install_root_for(bin_dir: &Utf8Path) -> Utf8PathBuf {
    bin_dir.parent().unwrap_or(bin_dir).to_owned()
}

/// Contents of `env.sh` for `bin_dir`.
#[must_use]
pub fn posix_env_script(bin_dir: &Utf8Path) -> String {
    format!(
        r#"#!/bin/sh
# rime shell setup
case ":${{PATH}}:" in
    *:"{bin_dir}":*)
        ;;
    *)
        export PATH="{bin_dir}:$PATH"
        ;;
esac
"#
    )
}

/// Contents of `env.fish` for `bin_dir`.
#[must_use]
pub fn fish_env_script(bin_dir: &Utf8Path) -> String {
    format!(
        r#"# rime shell setup
if not contains "{bin_dir}" $PATH
    set -gx PATH "{bin_dir}" $PATH
end
"#
    )
}

/// Write `env.sh` and `env.fish` into `install_root`.
///
/// # Errors
///
/// Returns [`InstallerError::FileSystem`] if either file cannot be written.
pub fn write_env_files(install_root: &Utf8Path, bin_dir: &Utf8Path) -> Result<EnvFiles> {
    std::fs::create_dir_all(install_root)
        .map_err(|e| InstallerError::file_system("create", install_root, &e))?;
    let files = EnvFiles {
        sh: install_root.join(ENV_SH_FILE),
        fish: install_root.join(ENV_FISH_FILE),
    };
    for (path, contents) in [
        (&files.sh, posix_env_script(bin_dir)),
        (&files.fish, fish_env_script(bin_dir)),
    ] {
        std::fs::write(path, contents)
            .map_err(|e| InstallerError::file_system("write", path, &e))?;
        log::debug!("wrote {path}");
    }
    Ok(files)
}

/// Remove rime's source lines from a profile's text.
///
/// Drops every line that sources an environment file under `install_root`,
/// along with a `# rime` comment directly above it and a blank line above
/// that. Returns `None` when nothing would change.
#[must_use]
pub fn strip_source_lines(profile: &str, install_root: &Utf8Path) -> Option<String> {
    let snippet = ShellSnippet::new(install_root);
    let is_source_line = |line: &str| {
        let trimmed = line.trim();
        trimmed == snippet.posix || trimmed == snippet.fish
    };

    let mut kept: Vec<&str> = Vec::new();
    let mut changed = false;
    for line in profile.lines() {
        if !is_source_line(line) {
            kept.push(line);
            continue;
        }
        changed = true;
        if kept.last().is_some_and(|prev| prev.trim() == PROFILE_MARKER) {
            kept.pop();
            if kept.last().is_some_and(|prev| prev.trim().is_empty()) {
                kept.pop();
            }
        }
    }

    if !changed {
        return None;
    }
    let mut text = kept.join("\n");
    if profile.ends_with('\n') && !text.is_empty() {
        text.push('\n');
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ROOT: &str = "/home/ada/.rime";

    #[test]
    fn install_root_is_parent_of_bin_dir() {
        assert_eq!(
            install_root_for(Utf8Path::new("/home/ada/.rime/bin")),
            Utf8PathBuf::from(ROOT)
        );
    }

    #[test]
    fn env_scripts_reference_bin_dir() {
        let bin = Utf8Path::new("/home/ada/.rime/bin");
        assert!(posix_env_script(bin).contains("export PATH=\"/home/ada/.rime/bin:$PATH\""));
        assert!(posix_env_script(bin).contains("case \":${PATH}:\" in"));
        assert!(fish_env_script(bin).contains("set -gx PATH \"/home/ada/.rime/bin\" $PATH"));
    }

    #[test]
    fn write_env_files_creates_both_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().join(".rime")).expect("utf8");
        let bin = root.join("bin");

        let files = write_env_files(&root, &bin).expect("write env files");

        assert_eq!(
            std::fs::read_to_string(&files.sh).expect("read env.sh"),
            posix_env_script(&bin)
        );
        assert_eq!(
            std::fs::read_to_string(&files.fish).expect("read env.fish"),
            fish_env_script(&bin)
        );
    }

    #[rstest]
    #[case::with_marker_and_blank(
        "export EDITOR=vi\n\n# rime\n. \"/home/ada/.rime/env.sh\"\n",
        "export EDITOR=vi\n"
    )]
    #[case::bare_line(
        "alias ll='ls -l'\n. \"/home/ada/.rime/env.sh\"\nexport A=1\n",
        "alias ll='ls -l'\nexport A=1\n"
    )]
    #[case::fish(
        "set -gx EDITOR vi\n\n# rime\nsource \"/home/ada/.rime/env.fish\"\n",
        "set -gx EDITOR vi\n"
    )]
    #[case::only_rime("# rime\n. \"/home/ada/.rime/env.sh\"\n", "")]
    fn strips_source_lines(#[case] profile: &str, #[case] expected: &str) {
        let stripped = strip_source_lines(profile, Utf8Path::new(ROOT)).expect("changed");
        assert_eq!(stripped, expected);
    }

    #[rstest]
    #[case::unrelated("export PATH=\"$HOME/bin:$PATH\"\n")]
    #[case::other_root("# rime\n. \"/opt/rime/env.sh\"\n")]
    fn leaves_other_profiles_alone(#[case] profile: &str) {
        assert_eq!(strip_source_lines(profile, Utf8Path::new(ROOT)), None);
    }

    #[test]
    fn keeps_marker_comment_without_source_line() {
        let profile = "# rime\necho hello\n";
        assert_eq!(strip_source_lines(profile, Utf8Path::new(ROOT)), None);
    }
}
