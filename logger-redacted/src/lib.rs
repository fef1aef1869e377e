//! HIPAA-compliant logging with PII redaction
//!
//! Identity workflows handle phone numbers (MSISDNs) and email addresses on
//! every call. Those values must never reach a log sink verbatim, so log
//! fields are passed through a [`PiiRedactor`] built from [`LoggerConfig`]
//! ([`PiiRedactor::phone`] / [`PiiRedactor::email`] for single values,
//! [`PiiRedactor::redact`] for free text) before being recorded.
//!
//! # Detected Data Types
//!
//! - **Phone Numbers**: +254700000123 → +254******123
//! - **Email Addresses**: jane.doe@example.com → j***@e***
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{redact_phone, PiiRedactor, RedactionConfig};
//!
//! assert_eq!(redact_phone("+254700000123"), "+254******123");
//!
//! let redactor = PiiRedactor::new(RedactionConfig::default());
//! let line = redactor.redact("OTP sent to +254700000123");
//! assert!(!line.contains("700000"));
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Logger initialization failed: {0}")]
    Init(String),
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level` when set.
pub fn init_logging(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| LoggerError::Init(e.to_string()))
}
