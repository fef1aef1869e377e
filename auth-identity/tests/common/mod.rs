#![allow(dead_code)]

use auth_identity::notification::RecordingNotifier;
use auth_identity::otp::InMemoryOtpService;
use auth_identity::permissions::{scope_set, DEFAULT_ADMIN_PERMISSIONS, MANAGE_EMPLOYEE};
use auth_identity::repository::{InMemoryIdentityProvider, InMemoryStore};
use auth_identity::*;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use telemetry::RecordingObserver;
use uuid::Uuid;

pub const PHONE: &str = "+254700000000";

/// Low iteration count keeps the PBKDF2 work fast in tests
pub fn test_config() -> IdentityConfig {
    IdentityConfig {
        pin_hash_iterations: 1_000,
        salt_length: 16,
        ..IdentityConfig::default()
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub provider: Arc<InMemoryIdentityProvider>,
    pub otp: Arc<InMemoryOtpService>,
    pub notifier: Arc<RecordingNotifier>,
    pub observer: Arc<RecordingObserver>,
    pub service: IdentityService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: IdentityConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let otp = Arc::new(InMemoryOtpService::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let observer = Arc::new(RecordingObserver::new());

        let deps = IdentityDeps {
            store: store.clone(),
            provider: provider.clone(),
            otp: otp.clone(),
            notifier: notifier.clone(),
        };
        let service = IdentityService::with_observer(deps, config, observer.clone()).unwrap();

        Self {
            store,
            provider,
            otp,
            notifier,
            observer,
            service,
        }
    }

    /// A second service over the same backends, e.g. after a config change
    pub fn service_with_config(&self, config: IdentityConfig) -> IdentityService {
        let deps = IdentityDeps {
            store: self.store.clone(),
            provider: self.provider.clone(),
            otp: self.otp.clone(),
            notifier: self.notifier.clone(),
        };
        IdentityService::new(deps, config).unwrap()
    }

    /// Consumer profile without a PIN
    pub fn seed_consumer(&self, phone: &str) -> UserProfile {
        let profile = profile(phone, UserRole::Consumer, BTreeSet::new());
        self.store.insert_profile(profile.clone());
        profile
    }

    /// Consumer profile with `pin` already set
    pub async fn seed_consumer_with_pin(&self, phone: &str, pin: &str) -> UserProfile {
        let profile = self.seed_consumer(phone);
        let ctx = RequestContext::background();
        assert!(self.service.pins().set_pin(&ctx, pin, phone).await.unwrap());
        profile
    }

    /// Staff member allowed to manage employees
    pub fn seed_manager(&self) -> UserProfile {
        let mut permissions = scope_set(DEFAULT_ADMIN_PERMISSIONS);
        permissions.insert(MANAGE_EMPLOYEE.to_string());
        let profile = profile("+254711000001", UserRole::Staff, permissions);
        self.store.insert_profile(profile.clone());
        profile
    }

    /// Staff member with the default admin scopes only
    pub fn seed_plain_admin(&self, phone: &str) -> UserProfile {
        let profile = profile(phone, UserRole::Staff, scope_set(DEFAULT_ADMIN_PERMISSIONS));
        self.store.insert_profile(profile.clone());
        profile
    }
}

pub fn profile(phone: &str, role: UserRole, permissions: BTreeSet<String>) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        uid: Uuid::new_v4().to_string(),
        primary_phone: phone.to_string(),
        primary_email: None,
        bio_data: bio("Amina", "Otieno"),
        role,
        permissions,
        role_ids: Vec::new(),
        suspended: false,
        created_by_id: None,
        created_at: Utc::now(),
    }
}

pub fn bio(first_name: &str, last_name: &str) -> BioData {
    BioData {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        gender: Gender::Female,
        date_of_birth: None,
    }
}

pub fn admin_input(phone: &str, email: Option<&str>) -> RegisterAdminInput {
    RegisterAdminInput {
        first_name: "Brian".to_string(),
        last_name: "Kamau".to_string(),
        gender: Gender::Male,
        date_of_birth: None,
        phone: phone.to_string(),
        email: email.map(str::to_string),
        role_ids: Vec::new(),
    }
}
