//! rime installer library.
//!
//! This crate resolves a prebuilt `rime` release for the current platform,
//! downloads it, verifies its SHA-256 digest, extracts the executable, and
//! installs it into a bin directory. It is used by the `rime-installer` CLI
//! binary and can be consumed programmatically for testing or custom
//! installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Release table model and the pure pipeline stages
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Layered installer configuration
//! - [`dirs`] - Directory resolution abstraction for the install root
//! - [`error`] - Error types and their classification
//! - [`install`] - Atomic placement of the executable
//! - [`list_output`] - Output formatting for release listing
//! - [`output`] - User-facing messages and shell snippets
//! - [`pipeline`] - Install pipeline orchestration
//! - [`shell_env`] - Shell environment files and profile editing
//! - [`smoke`] - Post-install `--version` check
//! - [`uninstall`] - Planned removal of an install

pub mod artefact;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod install;
pub mod list_output;
pub mod output;
pub mod pipeline;
pub mod shell_env;
pub mod smoke;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod uninstall;
