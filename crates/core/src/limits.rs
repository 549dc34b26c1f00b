//! Document key limits
//!
//! Keys are measured the way the `by_key` index stores them: as UTF-16.
//! Validation runs before any mutation is attempted.

use crate::error::{DocumentError, Result};

/// Maximum key size in bytes when encoded as UTF-16
pub const MAX_KEY_BYTES: usize = 2048;

/// Maximum key length in UTF-16 code units
pub const MAX_KEY_CODE_UNITS: usize = MAX_KEY_BYTES / 2;

/// Validate a document key
///
/// # Errors
///
/// `DocumentError::Validation` if the key is empty or its UTF-16 encoding
/// exceeds `MAX_KEY_BYTES`.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(DocumentError::Validation(
            "the document key must not be empty".to_string(),
        ));
    }
    let code_units = key.encode_utf16().count();
    if code_units > MAX_KEY_CODE_UNITS {
        return Err(DocumentError::Validation(format!(
            "the key must be a maximum of {} bytes in UTF-16 ({} code units), key has {} code units",
            MAX_KEY_BYTES, MAX_KEY_CODE_UNITS, code_units
        )));
    }
    Ok(())
}
