//! Credential hashing toolkit for RustCare Engine
//!
//! Provides the primitives the identity layer needs to keep PINs out of
//! storage in recoverable form:
//! - Random salt generation
//! - PBKDF2-HMAC-SHA256 derivation of a salted credential hash
//! - Constant-time comparison of stored and recomputed hashes
//! - Random numeric codes for system-issued temporary PINs
//!
//! # Example
//!
//! ```rust
//! use crypto::kdf::{Kdf, Pbkdf2Params};
//! use crypto::constant_time::ct_eq_str;
//!
//! let params = Pbkdf2Params { iterations: 1_000, salt_length: 16 };
//! let salt = Kdf::generate_salt_base64(params.salt_length);
//! let stored = Kdf::derive_credential_hash(b"1234", &salt, &params).unwrap();
//! let again = Kdf::derive_credential_hash(b"1234", &salt, &params).unwrap();
//! assert!(ct_eq_str(&stored, &again));
//! ```

pub mod constant_time;
pub mod error;
pub mod kdf;
pub mod random;

pub use error::*;
