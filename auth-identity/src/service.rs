use crate::admin::AdminService;
use crate::config::IdentityConfig;
use crate::notification::{Notifier, RecordingNotifier};
use crate::otp::{InMemoryOtpService, OtpService};
use crate::pin::PinManager;
use crate::repository::{IdentityProvider, IdentityStore, InMemoryIdentityProvider, InMemoryStore};
use crate::signup::SignupService;
use std::sync::Arc;
use telemetry::{OperationObserver, TracingObserver};

/// External collaborators the identity services are built on
#[derive(Clone)]
pub struct IdentityDeps {
    pub store: Arc<dyn IdentityStore>,
    pub provider: Arc<dyn IdentityProvider>,
    pub otp: Arc<dyn OtpService>,
    pub notifier: Arc<dyn Notifier>,
}

impl IdentityDeps {
    /// In-memory backends, for development and tests only
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            provider: Arc::new(InMemoryIdentityProvider::new()),
            otp: Arc::new(InMemoryOtpService::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }
}

/// PIN, signup and admin services sharing one set of collaborators and one observer
pub struct IdentityService {
    pins: Arc<PinManager>,
    signup: SignupService,
    admin: AdminService,
}

impl IdentityService {
    pub fn new(deps: IdentityDeps, config: IdentityConfig) -> anyhow::Result<Self> {
        Self::with_observer(deps, config, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        deps: IdentityDeps,
        config: IdentityConfig,
        observer: Arc<dyn OperationObserver>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let pins = Arc::new(
            PinManager::new(deps.store.clone(), deps.otp.clone(), config)
                .with_observer(observer.clone()),
        );
        let signup = SignupService::new(
            deps.store.clone(),
            deps.provider.clone(),
            deps.otp,
            pins.clone(),
        )
        .with_observer(observer.clone());
        let admin = AdminService::new(deps.store, deps.provider, deps.notifier, pins.clone())
            .with_observer(observer);

        Ok(Self { pins, signup, admin })
    }

    pub fn pins(&self) -> &PinManager {
        &self.pins
    }

    pub fn signup(&self) -> &SignupService {
        &self.signup
    }

    pub fn admin(&self) -> &AdminService {
        &self.admin
    }
}
