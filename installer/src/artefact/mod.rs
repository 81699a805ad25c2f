//! Release artefact model and the pure stages of the install pipeline.
//!
//! This module covers everything between "which release and platform?" and
//! "here are the executable's bytes":
//!
//! - [`error`] - Semantic error types for validation failures.
//! - [`platform`] - Operating system and architecture model (`Platform`).
//! - [`release_version`] - Release version newtype (`ReleaseVersion`).
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`manifest`] - Release manifests, the release table, and resolution.
//! - [`manifest_parser`] - TOML release table deserialization.
//! - [`download`] - Artefact download trait and HTTP implementation.
//! - [`verification`] - Checksum verification.
//! - [`extraction`] - In-memory executable extraction from `.tar.gz`.

pub mod download;
pub mod error;
pub mod extraction;
pub mod manifest;
pub mod manifest_parser;
pub mod platform;
pub mod release_version;
pub mod sha256_digest;
pub mod verification;
