use crate::error::InstallError;
use sha2::{Digest, Sha384};

/// Lowercase hex SHA-384 of `bytes`.
#[must_use]
pub fn sha384_hex(bytes: &[u8]) -> String {
    hex::encode(Sha384::digest(bytes))
}

/// Check `bytes` against a pinned hex digest (case-insensitive).
///
/// # Errors
///
/// `IntegrityMismatch` when the digests differ.
pub fn verify_sha384(bytes: &[u8], expected: &str) -> Result<(), InstallError> {
    let actual = sha384_hex(bytes);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(InstallError::IntegrityMismatch {
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        })
    }
}
