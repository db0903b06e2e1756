//! Consent authz gateway module.

use std::path::Path;
use std::sync::Arc;

use consent_authz_sdk::{ConsentGateClient, SessionDataStore};
use tracing::info;

use crate::config::ConsentAuthzGwConfig;
use crate::domain::{ConsentAuthzGwLocalClient, InMemorySessionStore, Service};

/// Consent authz gateway module.
///
/// Owns the gate [`Service`] and hands out [`ConsentGateClient`] handles to
/// the host's authentication and request pipelines.
pub struct ConsentAuthzGateway {
    service: Arc<Service>,
}

impl ConsentAuthzGateway {
    pub const MODULE_NAME: &'static str = "consent_authz";

    /// Build the gateway over the host's session store.
    ///
    /// # Errors
    ///
    /// Returns an error if `cfg` is invalid.
    #[tracing::instrument(skip_all, fields(session_key))]
    pub fn init(
        cfg: ConsentAuthzGwConfig,
        store: Arc<dyn SessionDataStore>,
    ) -> anyhow::Result<Self> {
        cfg.validate()?;
        tracing::Span::current().record("session_key", cfg.session_key.as_str());
        info!(
            superuser_role = %cfg.gate.superuser_role,
            admission_roles = cfg.gate.admission_roles.len(),
            tag_match = ?cfg.gate.tag_match,
            "Initializing {} gateway",
            Self::MODULE_NAME
        );

        let service = Arc::new(Service::new(cfg, store));

        info!("{} gateway initialized successfully", Self::MODULE_NAME);
        Ok(Self { service })
    }

    /// Load configuration from `path` (plus environment overrides) and build
    /// the gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn from_config_file(
        path: impl AsRef<Path>,
        store: Arc<dyn SessionDataStore>,
    ) -> anyhow::Result<Self> {
        let cfg = ConsentAuthzGwConfig::load(path)?;
        Self::init(cfg, store)
    }

    /// Build with an [`InMemorySessionStore`].
    ///
    /// # Errors
    ///
    /// Returns an error if `cfg` is invalid.
    pub fn in_memory(cfg: ConsentAuthzGwConfig) -> anyhow::Result<Self> {
        Self::init(cfg, Arc::new(InMemorySessionStore::new()))
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn ConsentGateClient> {
        Arc::new(ConsentAuthzGwLocalClient::new(self.service.clone()))
    }

    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }
}
