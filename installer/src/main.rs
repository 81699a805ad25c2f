//! rime installer CLI entrypoint.
//!
//! This binary resolves, verifies, and installs a prebuilt `rime` release,
//! then prints the shell configuration needed to put it on `PATH`.

use std::io::{BufRead, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use rime_installer::artefact::platform::Platform;
use rime_installer::cli::{Cli, Command, InstallArgs, ListArgs, UninstallArgs, VerifyArgs};
use rime_installer::config::{InstallerConfig, ResolvedConfig, release_table, resolve_config};
use rime_installer::dirs::{BaseDirs, SystemBaseDirs};
use rime_installer::error::{InstallFailure, InstallerError};
use rime_installer::install::InstallTarget;
use rime_installer::list_output::{format_human, format_json};
use rime_installer::output::{
    DryRunInfo, ShellSnippet, is_directory_in_path, path_instructions, success_message,
    write_stderr_line,
};
use rime_installer::pipeline::{InstallReport, InstallRequest, resolve_request, run_install};
use rime_installer::shell_env::{install_root_for, write_env_files};
use rime_installer::smoke::check_install;
use rime_installer::uninstall::{plan_uninstall, run_uninstall};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Install(#[from] InstallFailure),
    #[error(transparent)]
    Installer(#[from] InstallerError),
}

type Result<T> = std::result::Result<T, RunError>;

/// Standard streams handed to each command.
struct Streams<'a> {
    stdout: &'a mut dyn Write,
    stderr: &'a mut dyn Write,
    stdin: &'a mut dyn BufRead,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.install_args());

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let mut stdin = std::io::stdin().lock();
    let mut streams = Streams {
        stdout: &mut stdout,
        stderr: &mut stderr,
        stdin: &mut stdin,
    };

    let run_result = run(&cli, &SystemBaseDirs, &mut streams);
    let exit_code = exit_code_for_run_result(run_result, streams.stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Route `log` records through a `tracing` fmt subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the level from `warn`.
fn init_logging(args: &InstallArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(args.verbosity, args.quiet)));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        // A subscriber is already installed; keep it.
    }
}

fn default_log_level(verbosity: u8, quiet: bool) -> &'static str {
    match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

fn run(cli: &Cli, dirs: &dyn BaseDirs, streams: &mut Streams<'_>) -> Result<()> {
    match &cli.command {
        Some(Command::List(args)) => run_list(args, dirs, streams.stdout),
        Some(Command::Verify(args)) => run_verify(args, dirs, streams.stderr),
        Some(Command::Uninstall(args)) => run_uninstall_command(args, dirs, streams),
        Some(Command::Install(args)) => run_install_command(args, dirs, streams.stderr),
        None => run_install_command(&cli.install, dirs, streams.stderr),
    }
}

/// Resolves, downloads, verifies, and installs a release.
fn run_install_command(
    args: &InstallArgs,
    dirs: &dyn BaseDirs,
    stderr: &mut dyn Write,
) -> Result<()> {
    let config = resolve_config(args.config_overrides(), args.config.as_deref(), dirs)?;
    let table = release_table(config.manifest.as_deref())?;
    let request = InstallRequest {
        version: args.release.as_deref(),
        platform: args.platform(),
        bin_dir: &config.bin_dir,
        skip_verify: args.skip_verify,
        quiet: args.quiet,
    };

    // Dry-run mode: show what would be done without side effects
    if args.dry_run {
        let resolved = resolve_request(&table, &request)?;
        let executable = InstallTarget::rime(&config.bin_dir).executable_path();
        let platform = request.platform.asset_key();
        let info = DryRunInfo {
            version: resolved.manifest.version().as_str(),
            platform: &platform,
            url: resolved.descriptor.url(),
            sha256: resolved.descriptor.sha256().as_str(),
            executable: &executable,
            skip_verify: args.skip_verify,
            skip_env: args.skip_env,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let report = run_install(&table, &request, config.timeout, stderr)?;
    report_install(args, &config, &report, stderr)
}

/// Writes the environment files and tells the user how to use rime.
fn report_install(
    args: &InstallArgs,
    config: &ResolvedConfig,
    report: &InstallReport,
    stderr: &mut dyn Write,
) -> Result<()> {
    if !args.quiet {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, success_message(&report.version, &report.executable));
    }

    if !args.skip_env {
        let install_root = install_root_for(&config.bin_dir);
        write_env_files(&install_root, &config.bin_dir)?;
        if !args.quiet {
            write_stderr_line(stderr, "");
            write_stderr_line(stderr, ShellSnippet::new(&install_root).display_text());
        }
    }

    if !args.quiet && !is_directory_in_path(&config.bin_dir) {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, path_instructions(&config.bin_dir));
    }

    Ok(())
}

/// Prints the release table to stdout.
fn run_list(args: &ListArgs, dirs: &dyn BaseDirs, stdout: &mut dyn Write) -> Result<()> {
    let overrides = InstallerConfig {
        manifest: args.manifest.clone(),
        ..InstallerConfig::default()
    };
    let config = resolve_config(overrides, args.config.as_deref(), dirs)?;
    let table = release_table(config.manifest.as_deref())?;

    let output = if args.json {
        format_json(&table)
    } else {
        format_human(&table)
    };
    writeln!(stdout, "{output}").map_err(InstallerError::from)?;
    Ok(())
}

/// Runs the smoke test against an existing install.
fn run_verify(args: &VerifyArgs, dirs: &dyn BaseDirs, stderr: &mut dyn Write) -> Result<()> {
    let overrides = InstallerConfig {
        bin_dir: args.bin_dir.clone(),
        manifest: args.manifest.clone(),
        timeout_secs: None,
    };
    let config = resolve_config(overrides, args.config.as_deref(), dirs)?;
    let expected = match &args.release {
        Some(version) => version.trim_start_matches('v').to_owned(),
        None => latest_version(config.manifest.as_deref())?,
    };

    let target = InstallTarget::rime(&config.bin_dir);
    check_install(&target, &expected)?;
    write_stderr_line(
        stderr,
        format!("rime {expected} is installed at {}", target.executable_path()),
    );
    Ok(())
}

/// The newest release published for this host.
fn latest_version(manifest: Option<&camino::Utf8Path>) -> Result<String> {
    let table = release_table(manifest)?;
    let latest = table
        .latest_for(&Platform::host())
        .ok_or_else(|| InstallerError::Configuration {
            reason: "release table is empty".to_owned(),
        })?;
    Ok(latest.version().as_str().to_owned())
}

/// Plans, confirms, and performs an uninstall.
fn run_uninstall_command(
    args: &UninstallArgs,
    dirs: &dyn BaseDirs,
    streams: &mut Streams<'_>,
) -> Result<()> {
    let overrides = InstallerConfig {
        bin_dir: args.bin_dir.clone(),
        ..InstallerConfig::default()
    };
    let config = resolve_config(overrides, args.config.as_deref(), dirs)?;
    let home = dirs
        .home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .ok_or_else(|| InstallerError::Configuration {
            reason: "cannot determine a UTF-8 home directory".to_owned(),
        })?;

    let plan = plan_uninstall(&home, &config.bin_dir)?;
    run_uninstall(&plan, args.yes, streams.stdin, streams.stderr)?;
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
