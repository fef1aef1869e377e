use crate::context::RequestContext;
use crate::error::AdapterError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Receipt for a dispatched OTP. Never contains the code itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpHandle {
    pub phone: String,
    pub expires_at: DateTime<Utc>,
}

/// Remote OTP provider
#[async_trait]
pub trait OtpService: Send + Sync {
    /// Generate a one-time code and deliver it to `phone`
    async fn generate_and_send(
        &self,
        ctx: &RequestContext,
        phone: &str,
    ) -> Result<OtpHandle, AdapterError>;

    /// `Ok(false)` for a wrong, expired, already used or never issued code
    async fn verify(
        &self,
        ctx: &RequestContext,
        phone: &str,
        code: &str,
    ) -> Result<bool, AdapterError>;
}

const OTP_LENGTH: usize = 6;
const OTP_TTL_MINUTES: i64 = 10;

struct IssuedOtp {
    code: String,
    expires_at: DateTime<Utc>,
}

/// In-memory OTP provider. Codes are single-use.
#[derive(Default)]
pub struct InMemoryOtpService {
    issued: DashMap<String, IssuedOtp>,
    dispatched: AtomicUsize,
    verifications: AtomicUsize,
    fail_dispatch: AtomicBool,
}

impl InMemoryOtpService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known code for `phone`, as if it had been sent
    pub fn issue_code(&self, phone: &str, code: &str) {
        self.issued.insert(
            phone.to_string(),
            IssuedOtp {
                code: code.to_string(),
                expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
            },
        );
    }

    /// Code most recently sent to `phone` and not yet consumed
    pub fn pending_code(&self, phone: &str) -> Option<String> {
        self.issued.get(phone).map(|otp| otp.code.clone())
    }

    pub fn set_fail_dispatch(&self, fail: bool) {
        self.fail_dispatch.store(fail, Ordering::SeqCst);
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    pub fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OtpService for InMemoryOtpService {
    async fn generate_and_send(
        &self,
        _ctx: &RequestContext,
        phone: &str,
    ) -> Result<OtpHandle, AdapterError> {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        if self.fail_dispatch.load(Ordering::SeqCst) {
            return Err(AdapterError::Unavailable("sms gateway offline".to_string()));
        }

        let code = crypto::random::generate_numeric_code(OTP_LENGTH);
        self.issue_code(phone, &code);
        let expires_at = self
            .issued
            .get(phone)
            .map_or_else(Utc::now, |otp| otp.expires_at);

        Ok(OtpHandle {
            phone: phone.to_string(),
            expires_at,
        })
    }

    async fn verify(
        &self,
        _ctx: &RequestContext,
        phone: &str,
        code: &str,
    ) -> Result<bool, AdapterError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);

        let matches = self.issued.get(phone).is_some_and(|otp| {
            otp.expires_at > Utc::now() && crypto::constant_time::ct_eq_str(&otp.code, code)
        });
        if matches {
            self.issued.remove(phone);
        }
        Ok(matches)
    }
}
