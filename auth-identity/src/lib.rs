//! Identity and account management for RustCare Engine
//!
//! This crate provides:
//! - PIN credentials: set, temporary issue, OTP-gated reset, change, verification
//! - Consumer onboarding gated by a phone OTP
//! - Administrator registration, suspension and listing
//! - Collaborator traits for the store, identity provider, OTP and notification backends,
//!   with in-memory implementations for development and tests
//!
//! Every operation takes a [`RequestContext`]; cancelling it aborts the
//! workflow before its next backend call.
//!
//! # Example
//!
//! ```rust
//! use auth_identity::{IdentityConfig, IdentityDeps, IdentityService, RequestContext};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let service = IdentityService::new(IdentityDeps::in_memory(), IdentityConfig::default())?;
//! let ctx = RequestContext::background();
//!
//! let admins = service.admin().fetch_admins(&ctx).await?;
//! assert!(admins.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

pub mod admin;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notification;
pub mod otp;
pub mod permissions;
pub mod phone;
pub mod pin;
pub mod repository;
pub mod service;
pub mod signup;

pub use admin::AdminService;
pub use config::IdentityConfig;
pub use context::{CancelHandle, RequestContext};
pub use error::{AdapterError, IdentityError, Result};
pub use models::*;
pub use pin::PinManager;
pub use service::{IdentityDeps, IdentityService};
pub use signup::SignupService;
