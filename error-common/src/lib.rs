//! Common error handling utilities for RustCare Engine
//!
//! Every crate in the workspace keeps its own `thiserror` enum for the
//! failure sites it owns, and maps each variant onto exactly one
//! [`ErrorKind`]. The kind is what callers branch on: it carries a stable
//! error code and a [`RetryAdvice`] telling the client whether to retry with
//! different input, retry later, or contact support.
//!
//! # Error Categories
//!
//! - **InvalidInput**: malformed phone numbers, PINs, bio-data
//! - **NotFound**: missing profiles or credentials
//! - **Unauthorized**: failed permission or credential checks
//! - **UpstreamFailure**: OTP or notification provider errors
//! - **PersistenceFailure**: store errors
//! - **Cancelled**: the caller abandoned the request
//! - **Internal**: anything unexpected
//!
//! # Example
//!
//! ```rust
//! use error_common::{ErrorKind, ErrorReport, ErrorContext, RetryAdvice};
//!
//! let kind = ErrorKind::InvalidInput;
//! assert_eq!(kind.retry_advice(), RetryAdvice::RetryWithDifferentInput);
//!
//! let report = ErrorReport::new(kind, "PIN must be 4 digits")
//!     .with_context(ErrorContext::new().with_operation("set_pin"));
//! assert_eq!(report.code, "VALIDATION_1001");
//! ```

pub mod types;
pub mod context;
pub mod codes;
pub mod reporting;

pub use types::*;
pub use context::*;
pub use reporting::*;
