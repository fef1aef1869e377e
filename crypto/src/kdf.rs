use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Key derivation result
pub type KdfResult<T> = CryptoResult<T>;

/// Minimum accepted salt length in bytes
pub const MIN_SALT_LENGTH: usize = 16;

/// Length of the derived credential hash in bytes
pub const CREDENTIAL_HASH_LENGTH: usize = 32;

/// PBKDF2 parameters for key derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Params {
    /// Number of iterations
    pub iterations: u32,
    /// Salt length in bytes (minimum 16 bytes)
    pub salt_length: usize,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            salt_length: 32,
        }
    }
}

/// Key Derivation Function utilities
pub struct Kdf;

impl Kdf {
    /// Derive a key using PBKDF2-HMAC-SHA256
    ///
    /// # Arguments
    /// * `password` - The secret to derive from
    /// * `salt` - Salt for key derivation (unique per secret)
    /// * `iterations` - Number of iterations
    /// * `key_length` - Length of derived key in bytes
    pub fn pbkdf2(
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        key_length: usize,
    ) -> KdfResult<Zeroizing<Vec<u8>>> {
        if iterations == 0 {
            return Err(CryptoError::InvalidParams(
                "iterations must be greater than zero".to_string(),
            ));
        }
        if key_length == 0 {
            return Err(CryptoError::InvalidParams(
                "key length must be greater than zero".to_string(),
            ));
        }

        let mut derived_key = Zeroizing::new(vec![0u8; key_length]);
        pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut derived_key);

        Ok(derived_key)
    }

    /// Derive the stored form of a short credential (PIN) from its raw value
    /// and a base64 salt as produced by [`Kdf::generate_salt_base64`].
    ///
    /// The output is lowercase hex and is a pure function of
    /// `(secret, salt, iterations)`, so it can be recomputed for verification.
    pub fn derive_credential_hash(
        secret: &[u8],
        salt_b64: &str,
        params: &Pbkdf2Params,
    ) -> KdfResult<String> {
        let salt = STANDARD
            .decode(salt_b64)
            .map_err(|e| CryptoError::InvalidSalt(e.to_string()))?;

        if salt.len() < MIN_SALT_LENGTH {
            return Err(CryptoError::SaltTooShort {
                expected: MIN_SALT_LENGTH,
                got: salt.len(),
            });
        }

        let derived = Self::pbkdf2(secret, &salt, params.iterations, CREDENTIAL_HASH_LENGTH)?;
        Ok(hex::encode(derived.as_slice()))
    }

    /// Generate a cryptographically secure random salt
    pub fn generate_salt(length: usize) -> Vec<u8> {
        let mut salt = vec![0u8; length.max(MIN_SALT_LENGTH)];
        rand::thread_rng().fill_bytes(&mut salt);
        salt
    }

    /// Generate a salt and encode as base64 (for storage)
    pub fn generate_salt_base64(length: usize) -> String {
        STANDARD.encode(Self::generate_salt(length))
    }
}
