//! Constant-time operations to prevent timing attacks
//!
//! Stored credential hashes MUST be compared with these helpers, never `==`,
//! so that verification time does not leak how many leading bytes matched.

use subtle::ConstantTimeEq;

/// Constant-time comparison of byte slices
///
/// Returns true if slices are equal, false otherwise.
/// Execution time is independent of the slice contents.
///
/// # Example
///
/// ```rust
/// use crypto::constant_time::ct_eq;
///
/// assert!(ct_eq(b"stored_hash", b"stored_hash"));
/// assert!(!ct_eq(b"stored_hash", b"other_hash!"));
/// ```
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    // Length is not secret
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Constant-time comparison of strings
pub fn ct_eq_str(a: &str, b: &str) -> bool {
    ct_eq(a.as_bytes(), b.as_bytes())
}
