//! PIN credential lifecycle.
//!
//! PINs are stored only as PBKDF2 hashes; each record keeps its own random
//! salt and iteration count so it verifies after a config change. Every
//! set, reset or change inserts a new record and invalidates the previous
//! one, so the latest valid record is the active credential. A reset is split
//! into [`PinManager::request_pin_reset`] and [`PinManager::reset_pin`]; the
//! OTP proves phone ownership between the two and no session state is held
//! here.

use crate::config::IdentityConfig;
use crate::context::RequestContext;
use crate::error::{IdentityError, Result};
use crate::models::{PinCheck, PinRecord, PinUpdate, TemporaryPin, UserProfile};
use crate::otp::{OtpHandle, OtpService};
use crate::repository::{IdentityStore, StoreError};
use anyhow::anyhow;
use chrono::Utc;
use crypto::constant_time::ct_eq_str;
use crypto::kdf::{Kdf, Pbkdf2Params};
use logger_redacted::{PiiRedactor, RedactionConfig};
use std::sync::Arc;
use telemetry::{observe, OperationObserver, TracingObserver};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

pub struct PinManager {
    store: Arc<dyn IdentityStore>,
    otp: Arc<dyn OtpService>,
    observer: Arc<dyn OperationObserver>,
    redactor: PiiRedactor,
    config: IdentityConfig,
}

impl PinManager {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        otp: Arc<dyn OtpService>,
        config: IdentityConfig,
    ) -> Self {
        Self {
            store,
            otp,
            observer: Arc::new(TracingObserver),
            redactor: PiiRedactor::new(RedactionConfig::from(&config.logging)),
            config,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn OperationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Redactor for log fields, built from the `logging` config section
    pub fn redactor(&self) -> &PiiRedactor {
        &self.redactor
    }

    /// Exactly `pin_length` ASCII digits
    pub fn validate_pin_format(&self, raw_pin: &str) -> Result<()> {
        let expected = self.config.pin_length;
        if raw_pin.len() != expected || !raw_pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentityError::InvalidPinFormat { expected });
        }
        Ok(())
    }

    /// Create the PIN credential for the profile owning `phone`.
    pub async fn set_pin(&self, ctx: &RequestContext, raw_pin: &str, phone: &str) -> Result<bool> {
        observe(self.observer.as_ref(), "set_pin", async {
            self.validate_pin_format(raw_pin)?;
            let profile = self.resolve_profile(ctx, phone).await?;

            self.store_new_pin(ctx, profile.id, raw_pin, false).await?;
            info!(profile_id = %profile.id, "PIN set");
            Ok(true)
        })
        .await
    }

    /// Issue a system-generated one-time PIN that must be changed on first use.
    ///
    /// The raw PIN is returned so the caller can deliver it; it is never stored.
    pub async fn set_user_temp_pin(
        &self,
        ctx: &RequestContext,
        profile_id: Uuid,
    ) -> Result<TemporaryPin> {
        observe(self.observer.as_ref(), "set_user_temp_pin", async {
            let pin = crypto::random::generate_numeric_code(self.config.pin_length);
            self.store_new_pin(ctx, profile_id, &pin, true).await?;

            info!(profile_id = %profile_id, "Temporary PIN issued");
            Ok(TemporaryPin { profile_id, pin })
        })
        .await
    }

    /// Start a PIN reset by sending an OTP to the profile's phone.
    ///
    /// Only an existing credential can be reset; the OTP provider is not
    /// contacted otherwise.
    pub async fn request_pin_reset(&self, ctx: &RequestContext, phone: &str) -> Result<OtpHandle> {
        observe(self.observer.as_ref(), "request_pin_reset", async {
            let profile = self.resolve_profile(ctx, phone).await?;
            self.require_existing_pin(ctx, profile.id).await?;

            let handle = ctx
                .run(self.otp.generate_and_send(ctx, &profile.primary_phone))
                .await?
                .map_err(|e| {
                    warn!(
                        phone = %self.redactor.phone(&profile.primary_phone),
                        error = %e,
                        "OTP dispatch failed"
                    );
                    IdentityError::OtpDispatchFailed(e)
                })?;

            info!(profile_id = %profile.id, "PIN reset OTP sent");
            Ok(handle)
        })
        .await
    }

    /// Complete a PIN reset. The OTP is checked once; a failed check is final.
    pub async fn reset_pin(
        &self,
        ctx: &RequestContext,
        phone: &str,
        new_pin: &str,
        otp: &str,
    ) -> Result<PinUpdate> {
        observe(self.observer.as_ref(), "reset_pin", async {
            self.validate_pin_format(new_pin)?;
            let phone = self.config.normalize_phone(phone)?;

            match ctx.run(self.otp.verify(ctx, &phone, otp)).await? {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        phone = %self.redactor.phone(&phone),
                        "PIN reset rejected: OTP mismatch"
                    );
                    return Err(IdentityError::OtpVerificationFailed);
                }
                Err(e) => {
                    warn!(
                        phone = %self.redactor.phone(&phone),
                        error = %e,
                        "PIN reset rejected: OTP provider error"
                    );
                    return Err(IdentityError::OtpVerificationFailed);
                }
            }

            // The credential may have been removed since the OTP was requested
            let profile = self.resolve_profile(ctx, &phone).await?;
            self.require_existing_pin(ctx, profile.id).await?;

            let record = self.store_new_pin(ctx, profile.id, new_pin, false).await?;
            info!(profile_id = %profile.id, "PIN reset");
            Ok(PinUpdate {
                profile_id: profile.id,
                hashed_pin: record.hashed_pin,
            })
        })
        .await
    }

    /// Replace the PIN of an already authenticated user.
    pub async fn change_pin(
        &self,
        ctx: &RequestContext,
        phone: &str,
        new_pin: &str,
    ) -> Result<PinUpdate> {
        observe(self.observer.as_ref(), "change_pin", async {
            self.validate_pin_format(new_pin)?;
            let profile = self.resolve_profile(ctx, phone).await?;
            self.require_existing_pin(ctx, profile.id).await?;

            let record = self.store_new_pin(ctx, profile.id, new_pin, false).await?;
            info!(profile_id = %profile.id, "PIN changed");
            Ok(PinUpdate {
                profile_id: profile.id,
                hashed_pin: record.hashed_pin,
            })
        })
        .await
    }

    pub async fn check_has_pin(&self, ctx: &RequestContext, profile_id: Uuid) -> Result<bool> {
        observe(self.observer.as_ref(), "check_has_pin", async {
            Ok(self.active_pin(ctx, profile_id).await?.is_some())
        })
        .await
    }

    /// Authenticate `phone` with `raw_pin` against the active credential.
    pub async fn verify_pin(
        &self,
        ctx: &RequestContext,
        phone: &str,
        raw_pin: &str,
    ) -> Result<PinCheck> {
        observe(self.observer.as_ref(), "verify_pin", async {
            self.validate_pin_format(raw_pin)?;
            let profile = self.resolve_profile(ctx, phone).await?;
            if profile.suspended {
                return Err(IdentityError::AccountSuspended);
            }

            let record = self
                .active_pin(ctx, profile.id)
                .await?
                .ok_or(IdentityError::NoExistingCredential)?;

            let computed = self.hash_pin(raw_pin, &record.salt, record.iterations).await?;
            if !ct_eq_str(&computed, &record.hashed_pin) {
                warn!(profile_id = %profile.id, "PIN verification failed");
                return Err(IdentityError::InvalidCredentials);
            }

            debug!(profile_id = %profile.id, temporary = record.is_temporary, "PIN verified");
            Ok(PinCheck {
                profile_id: profile.id,
                is_temporary: record.is_temporary,
            })
        })
        .await
    }

    /// Active PIN record; a store "not found" is the same as no record.
    pub async fn active_pin(
        &self,
        ctx: &RequestContext,
        profile_id: Uuid,
    ) -> Result<Option<PinRecord>> {
        match ctx.run(self.store.get_pin_by_profile_id(ctx, profile_id)).await? {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn require_existing_pin(&self, ctx: &RequestContext, profile_id: Uuid) -> Result<()> {
        if self.active_pin(ctx, profile_id).await?.is_none() {
            debug!(profile_id = %profile_id, "No PIN on record");
            return Err(IdentityError::NoExistingCredential);
        }
        Ok(())
    }

    async fn resolve_profile(&self, ctx: &RequestContext, phone: &str) -> Result<UserProfile> {
        let phone = self.config.normalize_phone(phone)?;
        match ctx.run(self.store.get_profile_by_phone(ctx, &phone)).await? {
            Ok(profile) => Ok(profile),
            Err(StoreError::NotFound) => {
                debug!(phone = %self.redactor.phone(&phone), "No profile for phone");
                Err(IdentityError::ProfileNotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a new active record and invalidate the one it supersedes
    async fn store_new_pin(
        &self,
        ctx: &RequestContext,
        profile_id: Uuid,
        raw_pin: &str,
        is_temporary: bool,
    ) -> Result<PinRecord> {
        let previous = self.active_pin(ctx, profile_id).await?;

        let salt = Kdf::generate_salt_base64(self.config.salt_length);
        let iterations = self.config.pin_hash_iterations;
        let hashed_pin = self.hash_pin(raw_pin, &salt, iterations).await?;
        let record = PinRecord {
            id: Uuid::new_v4(),
            profile_id,
            hashed_pin,
            salt,
            iterations,
            is_temporary,
            valid: true,
            created_at: Utc::now(),
        };
        ctx.run(self.store.create_pin(ctx, &record)).await??;

        if let Some(mut previous) = previous {
            previous.valid = false;
            ctx.run(self.store.update_pin(ctx, &previous)).await??;
        }

        Ok(record)
    }

    /// PBKDF2 is CPU bound, so it runs on the blocking pool
    async fn hash_pin(&self, raw_pin: &str, salt: &str, iterations: u32) -> Result<String> {
        let raw_pin = Zeroizing::new(raw_pin.to_string());
        let salt = salt.to_string();
        let params = Pbkdf2Params {
            iterations,
            ..self.config.pbkdf2_params()
        };

        let hash = tokio::task::spawn_blocking(move || {
            Kdf::derive_credential_hash(raw_pin.as_bytes(), &salt, &params)
        })
        .await
        .map_err(|e| anyhow!("PIN hashing task failed: {e}"))??;

        Ok(hash)
    }
}
