//! In-memory store and identity provider for development and testing.

use super::{IdentityProvider, IdentityStore, StoreError, StoreResult};
use crate::context::RequestContext;
use crate::models::*;
use crate::permissions::has_permission;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// In-memory [`IdentityStore`].
///
/// Besides storage it supports fault injection per operation name
/// (`"get_pin_by_profile_id"`, `"create_profile"`, ...) and counts mutating
/// calls so tests can assert that a rejected request wrote nothing.
#[derive(Default)]
pub struct InMemoryStore {
    profiles: DashMap<Uuid, UserProfile>,
    pins: DashMap<Uuid, Vec<PinRecord>>,
    settings: DashMap<Uuid, CommunicationSettings>,
    suppliers: DashMap<Uuid, SupplierProfile>,
    customers: DashMap<Uuid, CustomerProfile>,
    roles: DashMap<String, Role>,
    faults: DashMap<&'static str, StoreError>,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call to `operation` fail with `error`
    pub fn fail(&self, operation: &'static str, error: StoreError) {
        self.faults.insert(operation, error);
    }

    pub fn clear_fault(&self, operation: &'static str) {
        self.faults.remove(operation);
    }

    /// Number of mutating calls that succeeded
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Seed a profile without counting it as a write
    pub fn insert_profile(&self, profile: UserProfile) {
        self.profiles.insert(profile.id, profile);
    }

    pub fn insert_role(&self, role: Role) {
        self.roles.insert(role.id.clone(), role);
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Every PIN record of a profile, oldest first
    pub fn pin_history(&self, profile_id: Uuid) -> Vec<PinRecord> {
        self.pins.get(&profile_id).map(|p| p.clone()).unwrap_or_default()
    }

    pub fn communication_settings(&self, profile_id: Uuid) -> Option<CommunicationSettings> {
        self.settings.get(&profile_id).map(|s| s.clone())
    }

    pub fn supplier_for(&self, profile_id: Uuid) -> Option<SupplierProfile> {
        self.suppliers.get(&profile_id).map(|s| s.clone())
    }

    pub fn customer_for(&self, profile_id: Uuid) -> Option<CustomerProfile> {
        self.customers.get(&profile_id).map(|c| c.clone())
    }

    fn check_fault(&self, operation: &'static str) -> StoreResult<()> {
        match self.faults.get(operation) {
            Some(error) => Err(error.value().clone()),
            None => Ok(()),
        }
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn find_profile(&self, predicate: impl Fn(&UserProfile) -> bool) -> StoreResult<UserProfile> {
        self.profiles
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn get_profile_by_phone(
        &self,
        _ctx: &RequestContext,
        phone: &str,
    ) -> StoreResult<UserProfile> {
        self.check_fault("get_profile_by_phone")?;
        self.find_profile(|p| p.primary_phone == phone)
    }

    async fn get_profile_by_id(&self, _ctx: &RequestContext, id: Uuid) -> StoreResult<UserProfile> {
        self.check_fault("get_profile_by_id")?;
        self.profiles
            .get(&id)
            .map(|p| p.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn get_profile_by_uid(
        &self,
        _ctx: &RequestContext,
        uid: &str,
    ) -> StoreResult<UserProfile> {
        self.check_fault("get_profile_by_uid")?;
        self.find_profile(|p| p.uid == uid)
    }

    async fn create_profile(
        &self,
        _ctx: &RequestContext,
        profile: &UserProfile,
    ) -> StoreResult<UserProfile> {
        self.check_fault("create_profile")?;
        if self.find_profile(|p| p.primary_phone == profile.primary_phone).is_ok() {
            return Err(StoreError::Conflict("primary phone already registered".to_string()));
        }
        if self.profiles.contains_key(&profile.id) {
            return Err(StoreError::Conflict("profile id already exists".to_string()));
        }
        self.profiles.insert(profile.id, profile.clone());
        self.record_write();
        Ok(profile.clone())
    }

    async fn update_suspended(
        &self,
        _ctx: &RequestContext,
        id: Uuid,
        suspended: bool,
    ) -> StoreResult<()> {
        self.check_fault("update_suspended")?;
        let mut profile = self.profiles.get_mut(&id).ok_or(StoreError::NotFound)?;
        profile.suspended = suspended;
        self.record_write();
        Ok(())
    }

    async fn update_bio_data(
        &self,
        _ctx: &RequestContext,
        id: Uuid,
        bio_data: &BioData,
    ) -> StoreResult<UserProfile> {
        self.check_fault("update_bio_data")?;
        let mut profile = self.profiles.get_mut(&id).ok_or(StoreError::NotFound)?;
        profile.bio_data = bio_data.clone();
        self.record_write();
        Ok(profile.clone())
    }

    async fn create_pin(&self, _ctx: &RequestContext, pin: &PinRecord) -> StoreResult<()> {
        self.check_fault("create_pin")?;
        if !self.profiles.contains_key(&pin.profile_id) {
            return Err(StoreError::NotFound);
        }
        self.pins.entry(pin.profile_id).or_default().push(pin.clone());
        self.record_write();
        Ok(())
    }

    async fn get_pin_by_profile_id(
        &self,
        _ctx: &RequestContext,
        profile_id: Uuid,
    ) -> StoreResult<Option<PinRecord>> {
        self.check_fault("get_pin_by_profile_id")?;
        Ok(self
            .pins
            .get(&profile_id)
            .and_then(|records| records.iter().rev().find(|p| p.valid).cloned()))
    }

    async fn update_pin(&self, _ctx: &RequestContext, pin: &PinRecord) -> StoreResult<()> {
        self.check_fault("update_pin")?;
        let mut records = self.pins.get_mut(&pin.profile_id).ok_or(StoreError::NotFound)?;
        let existing = records
            .iter_mut()
            .find(|p| p.id == pin.id)
            .ok_or(StoreError::NotFound)?;
        *existing = pin.clone();
        self.record_write();
        Ok(())
    }

    async fn set_communication_settings(
        &self,
        _ctx: &RequestContext,
        settings: &CommunicationSettings,
    ) -> StoreResult<CommunicationSettings> {
        self.check_fault("set_communication_settings")?;
        self.settings.insert(settings.profile_id, settings.clone());
        self.record_write();
        Ok(settings.clone())
    }

    async fn create_supplier_profile(
        &self,
        _ctx: &RequestContext,
        supplier: &SupplierProfile,
    ) -> StoreResult<SupplierProfile> {
        self.check_fault("create_supplier_profile")?;
        if self.suppliers.contains_key(&supplier.profile_id) {
            return Err(StoreError::Conflict("supplier already exists for profile".to_string()));
        }
        self.suppliers.insert(supplier.profile_id, supplier.clone());
        self.record_write();
        Ok(supplier.clone())
    }

    async fn create_empty_customer_profile(
        &self,
        _ctx: &RequestContext,
        profile_id: Uuid,
    ) -> StoreResult<CustomerProfile> {
        self.check_fault("create_empty_customer_profile")?;
        let customer = CustomerProfile {
            id: Uuid::new_v4(),
            profile_id,
        };
        self.customers.insert(profile_id, customer.clone());
        self.record_write();
        Ok(customer)
    }

    async fn list_profiles_by_role(
        &self,
        _ctx: &RequestContext,
        role: UserRole,
    ) -> StoreResult<Vec<UserProfile>> {
        self.check_fault("list_profiles_by_role")?;
        let mut profiles: Vec<UserProfile> = self
            .profiles
            .iter()
            .filter(|entry| entry.role == role)
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }

    async fn check_permission(
        &self,
        _ctx: &RequestContext,
        uid: &str,
        permission: &str,
    ) -> StoreResult<bool> {
        self.check_fault("check_permission")?;
        let profile = self.find_profile(|p| p.uid == uid)?;

        let mut granted: BTreeSet<String> = profile.permissions.clone();
        for role_id in &profile.role_ids {
            if let Some(role) = self.roles.get(role_id) {
                granted.extend(role.permissions.iter().cloned());
            }
        }
        Ok(has_permission(&granted, permission))
    }

    async fn get_roles_by_ids(
        &self,
        _ctx: &RequestContext,
        ids: &[String],
    ) -> StoreResult<Vec<Role>> {
        self.check_fault("get_roles_by_ids")?;
        Ok(ids
            .iter()
            .filter_map(|id| self.roles.get(id).map(|r| r.clone()))
            .collect())
    }

    async fn delete_profile(&self, _ctx: &RequestContext, id: Uuid) -> StoreResult<()> {
        self.check_fault("delete_profile")?;
        self.profiles.remove(&id).ok_or(StoreError::NotFound)?;
        self.pins.remove(&id);
        self.settings.remove(&id);
        self.suppliers.remove(&id);
        self.customers.remove(&id);
        self.record_write();
        Ok(())
    }
}

/// In-memory [`IdentityProvider`] keyed by normalised phone number
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    identities: DashMap<String, AuthIdentity>,
    issued: AtomicUsize,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    pub fn credentials_issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn get_or_create_identity(
        &self,
        _ctx: &RequestContext,
        phone: &str,
    ) -> StoreResult<AuthIdentity> {
        let identity = self
            .identities
            .entry(phone.to_string())
            .or_insert_with(|| AuthIdentity {
                uid: Uuid::new_v4().to_string(),
                phone: phone.to_string(),
            })
            .clone();
        Ok(identity)
    }

    async fn issue_credentials(
        &self,
        _ctx: &RequestContext,
        uid: &str,
    ) -> StoreResult<AuthCredentials> {
        if !self.identities.iter().any(|entry| entry.uid == uid) {
            return Err(StoreError::NotFound);
        }
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(AuthCredentials {
            uid: uid.to_string(),
            id_token: Uuid::new_v4().simple().to_string(),
            refresh_token: Uuid::new_v4().simple().to_string(),
            expires_in: 3600,
        })
    }
}
