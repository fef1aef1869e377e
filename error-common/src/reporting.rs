// Error reporting for API responses and logs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ErrorContext;
use crate::types::{Classify, ErrorKind, RetryAdvice};

/// Serializable description of a failure, safe to hand to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_id: Uuid,
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub retry: RetryAdvice,
    pub context: ErrorContext,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error_id: Uuid::new_v4(),
            kind,
            code: kind.code().to_string(),
            message: message.into(),
            retry: kind.retry_advice(),
            context: ErrorContext::new(),
            occurred_at: Utc::now(),
        }
    }

    /// Build a report from any classified error, using its display text
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Classify + std::fmt::Display,
    {
        let mut report = Self::new(error.kind(), error.to_string());
        report.code = error.code().to_string();
        report
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    /// Emit the report through `tracing`; client errors at warn, the rest at error
    pub fn log(&self) {
        if self.kind.is_client_error() {
            tracing::warn!(
                error_id = %self.error_id,
                error_kind = %self.kind,
                error_code = %self.code,
                operation = ?self.context.operation,
                "{}",
                self.message
            );
        } else {
            tracing::error!(
                error_id = %self.error_id,
                error_kind = %self.kind,
                error_code = %self.code,
                operation = ?self.context.operation,
                "{}",
                self.message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Denied;

    impl std::fmt::Display for Denied {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("permission denied")
        }
    }

    impl Classify for Denied {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Unauthorized
        }

        fn code(&self) -> &'static str {
            crate::codes::authorization::INSUFFICIENT_PERMISSIONS
        }
    }

    #[test]
    fn test_report_from_classified_error() {
        let report = ErrorReport::from_error(&Denied)
            .with_context(ErrorContext::new().with_operation("activate_admin"));

        assert_eq!(report.kind, ErrorKind::Unauthorized);
        assert_eq!(report.code, "AUTHZ_3002");
        assert_eq!(report.message, "permission denied");
        assert_eq!(report.retry, RetryAdvice::RetryWithDifferentInput);
        assert_eq!(report.context.operation.as_deref(), Some("activate_admin"));
    }

    #[test]
    fn test_report_serializes() {
        let report = ErrorReport::new(ErrorKind::Cancelled, "request cancelled");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kind"], "cancelled");
        assert_eq!(value["retry"], "retry_later");
        assert_eq!(value["code"], "SYSTEM_9001");
    }
}
