use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codes;

/// Failure class shared by every RustCare crate.
///
/// Crate-local error enums map each variant onto one kind; transports and
/// clients branch on the kind rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input (phone number, PIN, bio-data)
    InvalidInput,
    /// A profile, credential or other record is absent
    NotFound,
    /// Permission or credential check failed
    Unauthorized,
    /// OTP or notification provider failed
    UpstreamFailure,
    /// The backing store failed
    PersistenceFailure,
    /// The caller cancelled the request
    Cancelled,
    /// Unexpected or wrapped failure
    Internal,
}

/// What a client should do after receiving an error of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAdvice {
    RetryWithDifferentInput,
    RetryLater,
    ContactSupport,
}

impl ErrorKind {
    /// Stable error code for API responses
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => codes::validation::INVALID_INPUT,
            Self::NotFound => codes::lookup::RESOURCE_NOT_FOUND,
            Self::Unauthorized => codes::authorization::ACCESS_DENIED,
            Self::UpstreamFailure => codes::upstream::OTP_PROVIDER,
            Self::PersistenceFailure => codes::database::QUERY_FAILED,
            Self::Cancelled => codes::system::REQUEST_CANCELLED,
            Self::Internal => codes::system::INTERNAL,
        }
    }

    pub fn retry_advice(self) -> RetryAdvice {
        match self {
            Self::InvalidInput | Self::NotFound | Self::Unauthorized => {
                RetryAdvice::RetryWithDifferentInput
            }
            Self::UpstreamFailure | Self::PersistenceFailure | Self::Cancelled => {
                RetryAdvice::RetryLater
            }
            Self::Internal => RetryAdvice::ContactSupport,
        }
    }

    /// True when the caller, not the system, is at fault
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::InvalidInput | Self::NotFound | Self::Unauthorized)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::UpstreamFailure => "upstream_failure",
            Self::PersistenceFailure => "persistence_failure",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by crate error enums that classify into an [`ErrorKind`].
pub trait Classify {
    fn kind(&self) -> ErrorKind;

    /// More specific code than the kind default, if the failure site has one
    fn code(&self) -> &'static str {
        self.kind().code()
    }
}
