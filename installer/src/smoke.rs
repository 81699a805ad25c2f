//! Post-install smoke test.
//!
//! Runs the installed executable with `--version` and checks that its
//! output mentions the version that was just installed. The check is a
//! plain substring match, so `0.1.1` also accepts output naming `0.1.10`.

use std::io;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{InstallerError, Result};
use crate::install::InstallTarget;

/// How long the executable may take to answer `--version`.
pub const SMOKE_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `target --version` and return its trimmed standard output.
///
/// # Errors
///
/// Returns [`InstallerError::FileSystem`] if the executable cannot be
/// started or its output cannot be read, and
/// [`InstallerError::VerificationFailed`] if it does not finish within
/// `timeout`.
pub fn probe_version(target: &InstallTarget, timeout: Duration) -> Result<String> {
    let path = target.executable_path();
    log::debug!("running {path} --version");
    let mut child = Command::new(path.as_std_path())
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| InstallerError::file_system("run", &path, &e))?;

    // Stdout is drained concurrently with the wait.
    let reader = child
        .stdout
        .take()
        .map(|stdout| thread::spawn(move || std::io::read_to_string(stdout)));

    match child
        .wait_timeout(timeout)
        .map_err(|e| InstallerError::file_system("wait for", &path, &e))?
    {
        Some(status) => {
            let stdout = match reader {
                Some(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("output reader panicked")))
                    .map_err(|e| InstallerError::file_system("read output of", &path, &e))?,
                None => String::new(),
            };
            log::debug!("{path} --version exited with {status}");
            Ok(stdout.trim().to_owned())
        }
        None => {
            if let Err(e) = child.kill() {
                log::debug!("failed to kill {path}: {e}");
            }
            if let Err(e) = child.wait() {
                log::debug!("failed to reap {path}: {e}");
            }
            Err(InstallerError::VerificationFailed {
                path,
                expected: String::new(),
                output: format!("no answer within {} seconds", timeout.as_secs()),
            })
        }
    }
}

/// Check that the installed executable reports `expected_version`.
///
/// # Errors
///
/// Returns [`InstallerError::VerificationFailed`] when the output lacks the
/// version, and propagates errors from [`probe_version`].
pub fn check_install(target: &InstallTarget, expected_version: &str) -> Result<()> {
    let output = probe_version(target, SMOKE_TEST_TIMEOUT).map_err(|err| match err {
        InstallerError::VerificationFailed { path, output, .. } => {
            InstallerError::VerificationFailed {
                path,
                expected: expected_version.to_owned(),
                output,
            }
        }
        other => other,
    })?;
    if output.contains(expected_version) {
        Ok(())
    } else {
        Err(InstallerError::VerificationFailed {
            path: target.executable_path(),
            expected: expected_version.to_owned(),
            output,
        })
    }
}

/// Whether the installed executable reports `expected_version`.
///
/// Any failure to run the executable counts as `false`.
#[must_use]
pub fn verify_install(target: &InstallTarget, expected_version: &str) -> bool {
    match check_install(target, expected_version) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("smoke test failed: {err}");
            false
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::install::install;
    use crate::test_utils::stub_executable_script;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn installed_stub(script: &str) -> (TempDir, InstallTarget) {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        let target = InstallTarget::rime(bin);
        install(script.as_bytes(), &target).expect("install stub");
        (dir, target)
    }

    #[test]
    fn stub_reporting_the_version_passes() {
        let (_dir, target) = installed_stub(&stub_executable_script("0.2.0"));
        assert!(verify_install(&target, "0.2.0"));
    }

    #[test]
    fn prerelease_version_is_matched() {
        let (_dir, target) = installed_stub(&stub_executable_script("0.0.1-test"));
        assert!(verify_install(&target, "0.0.1-test"));
    }

    #[test]
    fn wrong_version_fails_with_output() {
        let (_dir, target) = installed_stub(&stub_executable_script("0.1.1"));

        let err = check_install(&target, "0.2.0").expect_err("version mismatch");

        assert!(
            matches!(err, InstallerError::VerificationFailed { ref output, .. } if output == "rime version 0.1.1")
        );
        assert!(!verify_install(&target, "0.2.0"));
    }

    #[test]
    fn substring_match_accepts_longer_versions() {
        let (_dir, target) = installed_stub(&stub_executable_script("0.1.10"));
        assert!(verify_install(&target, "0.1.1"));
    }

    #[test]
    fn missing_executable_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        assert!(!verify_install(&InstallTarget::rime(bin), "0.2.0"));
    }

    #[test]
    fn output_larger_than_a_pipe_buffer_is_read() {
        let script = concat!(
            "#!/bin/sh\n",
            "head -c 200000 /dev/zero | tr '\\0' 'x'\n",
            "echo\n",
            "echo \"rime version 0.2.0\"\n",
        );
        let (_dir, target) = installed_stub(script);

        let output = probe_version(&target, Duration::from_secs(5)).expect("probe");

        assert!(output.len() > 200_000);
        assert!(output.ends_with("rime version 0.2.0"));
    }

    #[test]
    fn hanging_executable_times_out() {
        let (_dir, target) = installed_stub("#!/bin/sh\nsleep 30\n");

        let err = probe_version(&target, Duration::from_millis(200)).expect_err("timeout");

        assert!(err.to_string().contains("no answer"));
    }
}
