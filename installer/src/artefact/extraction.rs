//! Executable extraction from release archives.
//!
//! Release archives are gzip-compressed tarballs holding the `rime`
//! executable. Extraction happens in memory: the matching entry is read
//! into a buffer and nothing is unpacked to disk, so archive paths can
//! never escape the install directory.

use std::io::Read;
use std::path::{Component, Path};

use flate2::read::GzDecoder;

/// Trait for extracting an executable from an archive, enabling test mocking.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::extraction::GzipTarExtractor;
///
/// let extractor = GzipTarExtractor;
/// // Use extractor.extract_executable(&archive_bytes, "rime") in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactExtractor {
    /// Return the contents of the single entry named `executable_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Malformed`] if the bytes are not a
    /// gzip-compressed tar archive, [`ExtractionError::EntryNotFound`] if no
    /// regular file has that name, and [`ExtractionError::AmbiguousEntry`]
    /// if more than one does.
    fn extract_executable(
        &self,
        archive: &[u8],
        executable_name: &str,
    ) -> Result<Vec<u8>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The archive could not be decompressed or read as a tarball.
    #[error("malformed archive: {0}")]
    Malformed(#[from] std::io::Error),

    /// No regular file in the archive has the requested name.
    #[error("archive does not contain {name}")]
    EntryNotFound {
        /// The executable name that was searched for.
        name: String,
    },

    /// More than one regular file in the archive has the requested name.
    #[error("archive contains more than one {name}")]
    AmbiguousEntry {
        /// The executable name that was searched for.
        name: String,
    },
}

/// Default extractor using the `flate2` and `tar` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipTarExtractor;

impl ArtefactExtractor for GzipTarExtractor {
    fn extract_executable(
        &self,
        archive: &[u8],
        executable_name: &str,
    ) -> Result<Vec<u8>, ExtractionError> {
        let mut tarball = tar::Archive::new(GzDecoder::new(archive));
        let mut found: Option<Vec<u8>> = None;

        for entry_result in tarball.entries()? {
            let mut entry = entry_result?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let entry_path = entry.path()?.into_owned();
            if !names_executable(&entry_path, executable_name) {
                continue;
            }
            if found.is_some() {
                return Err(ExtractionError::AmbiguousEntry {
                    name: executable_name.to_owned(),
                });
            }
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            log::debug!(
                "extracted {} ({} bytes)",
                entry_path.display(),
                contents.len()
            );
            found = Some(contents);
        }

        found.ok_or_else(|| ExtractionError::EntryNotFound {
            name: executable_name.to_owned(),
        })
    }
}

/// Whether `path` names the executable, ignoring leading `./` and any
/// parent directories. Paths that climb with `..` never match.
fn names_executable(path: &Path, executable_name: &str) -> bool {
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return false;
    }
    path.file_name()
        .is_some_and(|name| name == executable_name)
}
