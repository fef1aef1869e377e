use crate::context::RequestContext;
use crate::models::*;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;

pub use memory::{InMemoryIdentityProvider, InMemoryStore};

/// Store failure. `NotFound` is always distinguishable from a backend fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence for profiles, PIN records and the records created alongside them.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_profile_by_phone(
        &self,
        ctx: &RequestContext,
        phone: &str,
    ) -> StoreResult<UserProfile>;

    async fn get_profile_by_id(&self, ctx: &RequestContext, id: Uuid) -> StoreResult<UserProfile>;

    async fn get_profile_by_uid(&self, ctx: &RequestContext, uid: &str) -> StoreResult<UserProfile>;

    /// Fails with `Conflict` if the phone number is already taken
    async fn create_profile(
        &self,
        ctx: &RequestContext,
        profile: &UserProfile,
    ) -> StoreResult<UserProfile>;

    async fn update_suspended(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        suspended: bool,
    ) -> StoreResult<()>;

    async fn update_bio_data(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        bio_data: &BioData,
    ) -> StoreResult<UserProfile>;

    async fn create_pin(&self, ctx: &RequestContext, pin: &PinRecord) -> StoreResult<()>;

    /// Active (latest valid) PIN record; `Ok(None)` and `Err(NotFound)` both mean "no credential"
    async fn get_pin_by_profile_id(
        &self,
        ctx: &RequestContext,
        profile_id: Uuid,
    ) -> StoreResult<Option<PinRecord>>;

    async fn update_pin(&self, ctx: &RequestContext, pin: &PinRecord) -> StoreResult<()>;

    async fn set_communication_settings(
        &self,
        ctx: &RequestContext,
        settings: &CommunicationSettings,
    ) -> StoreResult<CommunicationSettings>;

    async fn create_supplier_profile(
        &self,
        ctx: &RequestContext,
        supplier: &SupplierProfile,
    ) -> StoreResult<SupplierProfile>;

    async fn create_empty_customer_profile(
        &self,
        ctx: &RequestContext,
        profile_id: Uuid,
    ) -> StoreResult<CustomerProfile>;

    async fn list_profiles_by_role(
        &self,
        ctx: &RequestContext,
        role: UserRole,
    ) -> StoreResult<Vec<UserProfile>>;

    /// Whether the identity `uid` holds `permission`, directly or through its roles
    async fn check_permission(
        &self,
        ctx: &RequestContext,
        uid: &str,
        permission: &str,
    ) -> StoreResult<bool>;

    /// Unknown ids are skipped
    async fn get_roles_by_ids(
        &self,
        ctx: &RequestContext,
        ids: &[String],
    ) -> StoreResult<Vec<Role>>;

    /// Hard delete of a profile and everything keyed by it
    async fn delete_profile(&self, ctx: &RequestContext, id: Uuid) -> StoreResult<()>;
}

/// Auth identity backend: owns the `uid` a profile is bound to and issues session credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Idempotent: the same phone always yields the same identity
    async fn get_or_create_identity(
        &self,
        ctx: &RequestContext,
        phone: &str,
    ) -> StoreResult<AuthIdentity>;

    async fn issue_credentials(
        &self,
        ctx: &RequestContext,
        uid: &str,
    ) -> StoreResult<AuthCredentials>;
}
