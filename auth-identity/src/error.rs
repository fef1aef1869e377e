use crate::repository::StoreError;
use crypto::CryptoError;
use error_common::{codes, Classify, ErrorContext, ErrorKind, ErrorReport};
use thiserror::Error;

/// Failure reported by a remote OTP or notification provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider rejected request: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid phone number: {0}")]
    PhoneNormalization(String),

    #[error("PIN must be exactly {expected} digits")]
    InvalidPinFormat { expected: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("No existing PIN for this profile")]
    NoExistingCredential,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account suspended")]
    AccountSuspended,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to send OTP: {0}")]
    OtpDispatchFailed(AdapterError),

    #[error("OTP verification failed")]
    OtpVerificationFailed,

    #[error("Notification delivery failed: {0}")]
    NotificationDeliveryFailed(AdapterError),

    #[error("Profile creation failed: {0}")]
    ProfileCreationFailed(StoreError),

    #[error("Store error: {0}")]
    Persistence(#[from] StoreError),

    #[error("PIN hashing failed: {0}")]
    Hashing(#[from] CryptoError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

impl IdentityError {
    /// Serializable report for the transport layer, tagged with the failing operation
    pub fn report(&self, operation: &str) -> ErrorReport {
        ErrorReport::from_error(self).with_context(ErrorContext::new().with_operation(operation))
    }
}

impl Classify for IdentityError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::PhoneNormalization(_) | Self::InvalidPinFormat { .. } | Self::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
            Self::ProfileNotFound | Self::UserNotFound | Self::NoExistingCredential => {
                ErrorKind::NotFound
            }
            Self::InvalidCredentials
            | Self::AccountSuspended
            | Self::PermissionDenied(_)
            | Self::OtpVerificationFailed => ErrorKind::Unauthorized,
            Self::OtpDispatchFailed(_) | Self::NotificationDeliveryFailed(_) => {
                ErrorKind::UpstreamFailure
            }
            Self::ProfileCreationFailed(e) | Self::Persistence(e) => match e {
                StoreError::NotFound => ErrorKind::NotFound,
                StoreError::Conflict(_) => ErrorKind::InvalidInput,
                StoreError::Backend(_) => ErrorKind::PersistenceFailure,
            },
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Hashing(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::PhoneNormalization(_) | Self::InvalidPinFormat { .. } => {
                codes::validation::INVALID_FORMAT
            }
            Self::InvalidCredentials | Self::OtpVerificationFailed => {
                codes::authentication::INVALID_CREDENTIALS
            }
            Self::AccountSuspended => codes::authentication::ACCOUNT_SUSPENDED,
            Self::PermissionDenied(_) => codes::authorization::INSUFFICIENT_PERMISSIONS,
            Self::NotificationDeliveryFailed(_) => codes::upstream::NOTIFICATION_PROVIDER,
            Self::ProfileCreationFailed(StoreError::Conflict(_))
            | Self::Persistence(StoreError::Conflict(_)) => codes::database::CONSTRAINT_VIOLATION,
            _ => self.kind().code(),
        }
    }
}
