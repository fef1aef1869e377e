//! Administrator registration, suspension and listing.
//!
//! Registration trusts the caller to be staff already; the acting identity
//! only stamps `created_by_id`. Suspension changes and PIN resends are gated
//! on [`MANAGE_EMPLOYEE`](crate::permissions::MANAGE_EMPLOYEE), checked
//! before anything is written.

use crate::config::IdentityConfig;
use crate::context::RequestContext;
use crate::error::{IdentityError, Result};
use crate::models::{
    AdminSummary, BioData, CommunicationSettings, RegisterAdminInput, SupplierProfile,
    TemporaryPin, UserProfile, UserRole,
};
use crate::notification::Notifier;
use crate::permissions::{scope_set, DEFAULT_ADMIN_PERMISSIONS, MANAGE_EMPLOYEE};
use crate::pin::PinManager;
use crate::repository::{IdentityProvider, IdentityStore, StoreError};
use chrono::Utc;
use logger_redacted::PiiRedactor;
use std::sync::Arc;
use telemetry::{observe, OperationObserver, TracingObserver};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct AdminService {
    store: Arc<dyn IdentityStore>,
    provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    pins: Arc<PinManager>,
    observer: Arc<dyn OperationObserver>,
    redactor: PiiRedactor,
    config: IdentityConfig,
}

impl AdminService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        provider: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        pins: Arc<PinManager>,
    ) -> Self {
        let config = pins.config().clone();
        let redactor = pins.redactor().clone();
        Self {
            store,
            provider,
            notifier,
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

    /// Create a staff account with a one-time PIN and send the welcome messages.
    ///
    /// Nothing is rolled back if a later step fails: a failed welcome SMS is
    /// reported as [`IdentityError::NotificationDeliveryFailed`] while the
    /// profile stays persisted.
    pub async fn register_administrator(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        input: RegisterAdminInput,
    ) -> Result<UserProfile> {
        observe(self.observer.as_ref(), "register_administrator", async {
            if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
                return Err(IdentityError::InvalidInput(
                    "first and last name are required".to_string(),
                ));
            }
            let phone = self.config.normalize_phone(&input.phone)?;

            let actor = match ctx.run(self.store.get_profile_by_uid(ctx, actor_uid)).await? {
                Ok(actor) => actor,
                Err(StoreError::NotFound) => {
                    warn!(actor_uid = %actor_uid, "Admin registration by unknown actor");
                    return Err(IdentityError::UserNotFound);
                }
                Err(e) => return Err(e.into()),
            };

            let identity = ctx.run(self.provider.get_or_create_identity(ctx, &phone)).await??;

            let profile = UserProfile {
                id: Uuid::new_v4(),
                uid: identity.uid,
                primary_phone: phone.clone(),
                primary_email: input.email.clone(),
                bio_data: BioData {
                    first_name: input.first_name.clone(),
                    last_name: input.last_name.clone(),
                    gender: input.gender,
                    date_of_birth: input.date_of_birth,
                },
                role: UserRole::Staff,
                permissions: scope_set(DEFAULT_ADMIN_PERMISSIONS),
                role_ids: input.role_ids.clone(),
                suspended: false,
                created_by_id: Some(actor.id),
                created_at: Utc::now(),
            };
            let profile = ctx
                .run(self.store.create_profile(ctx, &profile))
                .await?
                .map_err(|e| {
                    error!(
                        phone = %self.redactor.phone(&phone),
                        error = %e,
                        "Failed to create admin profile"
                    );
                    IdentityError::ProfileCreationFailed(e)
                })?;

            ctx.run(self.store.create_empty_customer_profile(ctx, profile.id)).await??;

            let supplier = SupplierProfile {
                id: Uuid::new_v4(),
                profile_id: profile.id,
                supplier_name: profile.bio_data.full_name(),
                is_organisation_verified: true,
                has_been_approved: true,
                created_at: Utc::now(),
            };
            ctx.run(self.store.create_supplier_profile(ctx, &supplier)).await??;

            let settings = CommunicationSettings::all_enabled(profile.id);
            ctx.run(self.store.set_communication_settings(ctx, &settings))
                .await??;

            let temp_pin = self.pins.set_user_temp_pin(ctx, profile.id).await?;
            self.send_welcome(ctx, &profile, &temp_pin).await?;

            info!(
                profile_id = %profile.id,
                created_by = %actor.id,
                "Administrator registered"
            );
            Ok(profile)
        })
        .await
    }

    pub async fn activate_administrator(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        target_id: Uuid,
    ) -> Result<bool> {
        observe(self.observer.as_ref(), "activate_administrator", async {
            self.set_suspended(ctx, actor_uid, target_id, false).await
        })
        .await
    }

    pub async fn deactivate_administrator(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        target_id: Uuid,
    ) -> Result<bool> {
        observe(self.observer.as_ref(), "deactivate_administrator", async {
            self.set_suspended(ctx, actor_uid, target_id, true).await
        })
        .await
    }

    /// Issue a new one-time PIN to an administrator who never completed first sign-in.
    pub async fn resend_temporary_pin(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        target_id: Uuid,
    ) -> Result<bool> {
        observe(self.observer.as_ref(), "resend_temporary_pin", async {
            self.require_permission(ctx, actor_uid, MANAGE_EMPLOYEE).await?;
            let profile = self.resolve_target(ctx, target_id).await?;

            let temp_pin = self.pins.set_user_temp_pin(ctx, profile.id).await?;
            let body = IdentityConfig::render_welcome(
                &self.config.admin_welcome_sms_template,
                &profile.bio_data.first_name,
                &temp_pin.pin,
            );
            ctx.run(self.notifier.send_sms(ctx, &[profile.primary_phone.clone()], &body))
                .await?
                .map_err(IdentityError::NotificationDeliveryFailed)?;

            info!(profile_id = %profile.id, "Temporary PIN resent");
            Ok(true)
        })
        .await
    }

    /// Every staff profile with whether its current credential is a pending one-time PIN.
    ///
    /// Any lookup failure fails the whole call; no partial list is returned.
    pub async fn fetch_admins(&self, ctx: &RequestContext) -> Result<Vec<AdminSummary>> {
        observe(self.observer.as_ref(), "fetch_admins", async {
            let profiles = ctx
                .run(self.store.list_profiles_by_role(ctx, UserRole::Staff))
                .await??;

            let mut admins = Vec::with_capacity(profiles.len());
            for profile in profiles {
                let resend_pin = self
                    .pins
                    .active_pin(ctx, profile.id)
                    .await?
                    .is_some_and(|record| record.is_temporary);
                admins.push(AdminSummary { profile, resend_pin });
            }

            debug!(count = admins.len(), "Fetched administrators");
            Ok(admins)
        })
        .await
    }

    async fn set_suspended(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        target_id: Uuid,
        suspended: bool,
    ) -> Result<bool> {
        self.require_permission(ctx, actor_uid, MANAGE_EMPLOYEE).await?;
        let profile = self.resolve_target(ctx, target_id).await?;

        ctx.run(self.store.update_suspended(ctx, profile.id, suspended)).await??;
        info!(
            profile_id = %profile.id,
            suspended,
            actor_uid = %actor_uid,
            "Administrator status changed"
        );
        Ok(true)
    }

    /// An actor the store does not know holds no permissions
    async fn require_permission(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        permission: &str,
    ) -> Result<()> {
        match ctx.run(self.store.check_permission(ctx, actor_uid, permission)).await? {
            Ok(true) => Ok(()),
            Ok(false) | Err(StoreError::NotFound) => {
                warn!(actor_uid = %actor_uid, permission, "Permission check failed");
                Err(IdentityError::PermissionDenied(permission.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_target(&self, ctx: &RequestContext, target_id: Uuid) -> Result<UserProfile> {
        match ctx.run(self.store.get_profile_by_id(ctx, target_id)).await? {
            Ok(profile) => Ok(profile),
            Err(StoreError::NotFound) => Err(IdentityError::ProfileNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// SMS is mandatory; email only when the profile has an address
    async fn send_welcome(
        &self,
        ctx: &RequestContext,
        profile: &UserProfile,
        temp_pin: &TemporaryPin,
    ) -> Result<()> {
        let first_name = &profile.bio_data.first_name;
        let templates = &self.config;

        let sms = IdentityConfig::render_welcome(
            &templates.admin_welcome_sms_template,
            first_name,
            &temp_pin.pin,
        );
        ctx.run(self.notifier.send_sms(ctx, &[profile.primary_phone.clone()], &sms))
            .await?
            .map_err(|e| {
                error!(
                    profile_id = %profile.id,
                    phone = %self.redactor.phone(&profile.primary_phone),
                    error = %e,
                    "Welcome SMS failed"
                );
                IdentityError::NotificationDeliveryFailed(e)
            })?;

        if let Some(address) = &profile.primary_email {
            let body = IdentityConfig::render_welcome(
                &templates.admin_welcome_email_template,
                first_name,
                &temp_pin.pin,
            );
            let subject = &templates.admin_welcome_email_subject;
            ctx.run(self.notifier.send_email(ctx, address, &body, subject))
                .await?
                .map_err(|e| {
                    error!(
                        profile_id = %profile.id,
                        email = %self.redactor.email(address),
                        error = %e,
                        "Welcome email failed"
                    );
                    IdentityError::NotificationDeliveryFailed(e)
                })?;
        }
        Ok(())
    }
}
