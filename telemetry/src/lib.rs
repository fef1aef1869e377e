//! Observability hooks for RustCare Engine services
//!
//! Services do not touch a global tracer directly. Each one holds an
//! injected [`OperationObserver`] and runs every public operation through
//! [`observe`], which:
//! - enters a `tracing` span named after the operation
//! - notifies the observer when the operation starts
//! - notifies it again on completion with the elapsed time and, on failure,
//!   the error annotation
//!
//! # Example
//!
//! ```rust
//! use telemetry::{observe, RecordingObserver};
//!
//! let observer = RecordingObserver::new();
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let result: Result<u32, String> = rt.block_on(observe(&observer, "set_pin", async { Ok(4) }));
//!
//! assert_eq!(result, Ok(4));
//! assert_eq!(observer.events().len(), 2);
//! ```

pub mod observer;

pub use observer::*;
