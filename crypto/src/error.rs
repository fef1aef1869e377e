use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid salt encoding: {0}")]
    InvalidSalt(String),

    #[error("Salt too short: expected at least {expected} bytes, got {got}")]
    SaltTooShort { expected: usize, got: usize },

    #[error("Invalid key derivation parameters: {0}")]
    InvalidParams(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
