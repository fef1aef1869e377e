// JSON handlers for the identity service
// A transport layer (axum or similar) maps these envelopes onto HTTP responses

use crate::context::RequestContext;
use crate::error::Result;
use crate::models::{BioData, CreateAccountInput, RegisterAdminInput};
use crate::service::IdentityService;
use error_common::ErrorContext;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct PhoneRequest {
    pub phone: String,
}

#[derive(Deserialize)]
pub struct PinRequest {
    pub phone: String,
    pub pin: String,
}

#[derive(Deserialize)]
pub struct ResetPinRequest {
    pub phone: String,
    pub pin: String,
    pub otp: String,
}

pub struct IdentityHandlers {
    service: Arc<IdentityService>,
}

impl IdentityHandlers {
    pub fn new(service: Arc<IdentityService>) -> Self {
        Self { service }
    }

    pub async fn set_pin(&self, ctx: &RequestContext, request: PinRequest) -> Value {
        let result = self.service.pins().set_pin(ctx, &request.pin, &request.phone).await;
        respond(ctx, "set_pin", result)
    }

    pub async fn login(&self, ctx: &RequestContext, request: PinRequest) -> Value {
        let result = self.service.pins().verify_pin(ctx, &request.phone, &request.pin).await;
        respond(ctx, "verify_pin", result)
    }

    pub async fn request_pin_reset(&self, ctx: &RequestContext, request: PhoneRequest) -> Value {
        let result = self.service.pins().request_pin_reset(ctx, &request.phone).await;
        respond(ctx, "request_pin_reset", result)
    }

    pub async fn reset_pin(&self, ctx: &RequestContext, request: ResetPinRequest) -> Value {
        let result = self
            .service
            .pins()
            .reset_pin(ctx, &request.phone, &request.pin, &request.otp)
            .await;
        respond(ctx, "reset_pin", result)
    }

    pub async fn change_pin(&self, ctx: &RequestContext, request: PinRequest) -> Value {
        let result = self.service.pins().change_pin(ctx, &request.phone, &request.pin).await;
        respond(ctx, "change_pin", result)
    }

    pub async fn create_account(&self, ctx: &RequestContext, request: CreateAccountInput) -> Value {
        let result = self.service.signup().create_account(ctx, request).await;
        respond(ctx, "create_account", result)
    }

    pub async fn update_bio_data(
        &self,
        ctx: &RequestContext,
        profile_id: Uuid,
        request: BioData,
    ) -> Value {
        let result = self.service.signup().update_bio_data(ctx, profile_id, request).await;
        respond(ctx, "update_bio_data", result)
    }

    pub async fn register_admin(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        request: RegisterAdminInput,
    ) -> Value {
        let result = self.service.admin().register_administrator(ctx, actor_uid, request).await;
        respond(ctx, "register_administrator", result)
    }

    pub async fn activate_admin(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        target_id: Uuid,
    ) -> Value {
        let result = self.service.admin().activate_administrator(ctx, actor_uid, target_id).await;
        respond(ctx, "activate_administrator", result)
    }

    pub async fn deactivate_admin(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        target_id: Uuid,
    ) -> Value {
        let result = self.service.admin().deactivate_administrator(ctx, actor_uid, target_id).await;
        respond(ctx, "deactivate_administrator", result)
    }

    pub async fn resend_temporary_pin(
        &self,
        ctx: &RequestContext,
        actor_uid: &str,
        target_id: Uuid,
    ) -> Value {
        let result = self.service.admin().resend_temporary_pin(ctx, actor_uid, target_id).await;
        respond(ctx, "resend_temporary_pin", result)
    }

    pub async fn fetch_admins(&self, ctx: &RequestContext) -> Value {
        let result = self.service.admin().fetch_admins(ctx).await;
        respond(ctx, "fetch_admins", result)
    }
}

/// Success carries `data`; failure carries a logged [`ErrorReport`](error_common::ErrorReport)
fn respond<T: Serialize>(ctx: &RequestContext, operation: &str, result: Result<T>) -> Value {
    match result {
        Ok(data) => json!({
            "success": true,
            "data": data,
        }),
        Err(e) => {
            let report = e.report(operation).with_context(
                ErrorContext::new()
                    .with_operation(operation)
                    .with_request_id(ctx.request_id().to_string()),
            );
            report.log();
            json!({
                "success": false,
                "error": report,
            })
        }
    }
}
