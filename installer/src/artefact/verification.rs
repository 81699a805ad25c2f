//! Checksum verification for downloaded artefacts.
//!
//! A downloaded archive is trusted only once its SHA-256 digest equals the
//! digest recorded in the release table. The comparison is
//! case-insensitive: both sides are lower-cased by [`Sha256Digest`].

use super::sha256_digest::Sha256Digest;

/// The downloaded bytes do not hash to the expected digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("checksum mismatch: expected {expected}, got {actual}")]
pub struct ChecksumMismatch {
    /// The digest recorded in the release table.
    pub expected: Sha256Digest,
    /// The digest of the downloaded bytes.
    pub actual: Sha256Digest,
}

/// Verify that `bytes` hash to `expected`.
///
/// # Errors
///
/// Returns [`ChecksumMismatch`] when the digests differ.
///
/// # Examples
///
/// ```
/// use rime_installer::artefact::sha256_digest::Sha256Digest;
/// use rime_installer::artefact::verification::verify_checksum;
///
/// let expected = Sha256Digest::try_from(
///     "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD",
/// )
/// .expect("valid digest");
/// assert!(verify_checksum(b"abc", &expected).is_ok());
/// assert!(verify_checksum(b"abd", &expected).is_err());
/// ```
pub fn verify_checksum(bytes: &[u8], expected: &Sha256Digest) -> Result<(), ChecksumMismatch> {
    let actual = Sha256Digest::of(bytes);
    if &actual == expected {
        Ok(())
    } else {
        Err(ChecksumMismatch {
            expected: expected.clone(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_digest_passes() {
        let expected = Sha256Digest::of(b"archive bytes");
        assert_eq!(verify_checksum(b"archive bytes", &expected), Ok(()));
    }

    #[test]
    fn mismatch_reports_both_digests() {
        let expected = Sha256Digest::try_from("0".repeat(64)).expect("valid");
        let err = verify_checksum(b"tampered", &expected).expect_err("mismatch");
        assert_eq!(err.expected, expected);
        assert_eq!(err.actual, Sha256Digest::of(b"tampered"));
        assert!(err.to_string().contains(&"0".repeat(64)));
    }

    #[test]
    fn empty_input_is_hashed() {
        let expected = Sha256Digest::of(b"");
        assert!(verify_checksum(&[], &expected).is_ok());
    }
}
