//! Consumer onboarding.
//!
//! `create_account` is a best-effort saga. The OTP check gates everything: an
//! unverified OTP leaves no trace in any backend. Steps after the gate are not
//! compensated, so a failure part-way leaves the earlier writes in place and
//! the typed error of the failing step is returned.

use crate::config::IdentityConfig;
use crate::context::RequestContext;
use crate::error::{IdentityError, Result};
use crate::models::{
    AccountResponse, BioData, CommunicationSettings, CreateAccountInput, UserProfile, UserRole,
};
use crate::otp::OtpService;
use crate::permissions::{navigation_for, scope_set, DEFAULT_CONSUMER_PERMISSIONS};
use crate::pin::PinManager;
use crate::repository::{IdentityProvider, IdentityStore, StoreError};
use chrono::Utc;
use logger_redacted::PiiRedactor;
use std::sync::Arc;
use telemetry::{observe, OperationObserver, TracingObserver};
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct SignupService {
    store: Arc<dyn IdentityStore>,
    provider: Arc<dyn IdentityProvider>,
    otp: Arc<dyn OtpService>,
    pins: Arc<PinManager>,
    observer: Arc<dyn OperationObserver>,
    redactor: PiiRedactor,
    config: IdentityConfig,
}

impl SignupService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        provider: Arc<dyn IdentityProvider>,
        otp: Arc<dyn OtpService>,
        pins: Arc<PinManager>,
    ) -> Self {
        let config = pins.config().clone();
        let redactor = pins.redactor().clone();
        Self {
            store,
            provider,
            otp,
            pins,
            observer: Arc::new(TracingObserver),
            redactor,
            config,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn OperationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Register a consumer after proving ownership of `input.phone` with an OTP.
    pub async fn create_account(
        &self,
        ctx: &RequestContext,
        input: CreateAccountInput,
    ) -> Result<AccountResponse> {
        observe(self.observer.as_ref(), "create_account", async {
            self.pins.validate_pin_format(&input.pin)?;
            validate_names(&input.bio_data)?;
            let phone = self.config.normalize_phone(&input.phone)?;

            let verified = match ctx.run(self.otp.verify(ctx, &phone, &input.otp)).await? {
                Ok(verified) => verified,
                Err(e) => {
                    warn!(
                        phone = %self.redactor.phone(&phone),
                        error = %e,
                        "OTP provider error during signup"
                    );
                    false
                }
            };
            if !verified {
                warn!(phone = %self.redactor.phone(&phone), "Signup rejected: OTP not verified");
                return Err(IdentityError::OtpVerificationFailed);
            }

            let identity = ctx.run(self.provider.get_or_create_identity(ctx, &phone)).await??;

            let profile = UserProfile {
                id: Uuid::new_v4(),
                uid: identity.uid,
                primary_phone: phone.clone(),
                primary_email: input.email.clone(),
                bio_data: input.bio_data.clone(),
                role: UserRole::Consumer,
                permissions: scope_set(DEFAULT_CONSUMER_PERMISSIONS),
                role_ids: input.role_ids.clone().unwrap_or_default(),
                suspended: false,
                created_by_id: None,
                created_at: Utc::now(),
            };
            let profile = ctx
                .run(self.store.create_profile(ctx, &profile))
                .await?
                .map_err(|e| {
                    error!(
                        phone = %self.redactor.phone(&phone),
                        error = %e,
                        "Failed to create profile"
                    );
                    IdentityError::ProfileCreationFailed(e)
                })?;

            let credentials = ctx.run(self.provider.issue_credentials(ctx, &profile.uid)).await??;

            self.pins.set_pin(ctx, &input.pin, &phone).await?;

            let settings = CommunicationSettings::all_enabled(profile.id);
            let communication_settings = ctx
                .run(self.store.set_communication_settings(ctx, &settings))
                .await??;

            let roles = if profile.role_ids.is_empty() {
                Vec::new()
            } else {
                ctx.run(self.store.get_roles_by_ids(ctx, &profile.role_ids)).await??
            };
            let mut granted = profile.permissions.clone();
            for role in &roles {
                granted.extend(role.permissions.iter().cloned());
            }
            let navigation = navigation_for(&granted);

            info!(
                profile_id = %profile.id,
                uid = %profile.uid,
                roles = roles.len(),
                "Account created"
            );
            Ok(AccountResponse {
                profile,
                communication_settings,
                credentials,
                roles,
                navigation,
            })
        })
        .await
    }

    pub async fn update_bio_data(
        &self,
        ctx: &RequestContext,
        profile_id: Uuid,
        bio_data: BioData,
    ) -> Result<UserProfile> {
        observe(self.observer.as_ref(), "update_bio_data", async {
            validate_names(&bio_data)?;

            match ctx.run(self.store.update_bio_data(ctx, profile_id, &bio_data)).await? {
                Ok(profile) => {
                    info!(profile_id = %profile_id, "Bio data updated");
                    Ok(profile)
                }
                Err(StoreError::NotFound) => Err(IdentityError::ProfileNotFound),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Remove a test account and its credentials. Refused unless
    /// `allow_test_purge` is set.
    pub async fn purge_test_account(&self, ctx: &RequestContext, phone: &str) -> Result<()> {
        observe(self.observer.as_ref(), "purge_test_account", async {
            if !self.config.allow_test_purge {
                warn!("Test account purge attempted while disabled");
                return Err(IdentityError::PermissionDenied(
                    "test account purge is disabled".to_string(),
                ));
            }

            let phone = self.config.normalize_phone(phone)?;
            let profile = match ctx.run(self.store.get_profile_by_phone(ctx, &phone)).await? {
                Ok(profile) => profile,
                Err(StoreError::NotFound) => return Err(IdentityError::ProfileNotFound),
                Err(e) => return Err(e.into()),
            };

            ctx.run(self.store.delete_profile(ctx, profile.id)).await??;
            warn!(
                profile_id = %profile.id,
                phone = %self.redactor.phone(&phone),
                "Test account purged"
            );
            Ok(())
        })
        .await
    }
}

fn validate_names(bio_data: &BioData) -> Result<()> {
    if bio_data.first_name.trim().is_empty() || bio_data.last_name.trim().is_empty() {
        return Err(IdentityError::InvalidInput("first and last name are required".to_string()));
    }
    Ok(())
}
