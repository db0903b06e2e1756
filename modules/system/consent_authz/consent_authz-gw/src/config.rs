//! Configuration for the consent authz gateway.

use std::path::Path;

use anyhow::Context;
use consent_authz_sdk::pep::GatePolicy;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

/// Prefix of environment overrides, e.g. `CONSENT_AUTHZ__GATE__TAG_MATCH`.
pub const ENV_PREFIX: &str = "CONSENT_AUTHZ__";

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsentAuthzGwConfig {
    /// Request gate policy.
    pub gate: GatePolicy,

    /// Where consent and role claims are read from.
    pub claims: ClaimSourceConfig,

    /// Session key under which the serialized grant model is stored.
    pub session_key: String,
}

impl Default for ConsentAuthzGwConfig {
    fn default() -> Self {
        Self {
            gate: GatePolicy::default(),
            claims: ClaimSourceConfig::default(),
            session_key: "consentGrants".to_owned(),
        }
    }
}

impl ConsentAuthzGwConfig {
    /// Load from a YAML file, then apply `CONSENT_AUTHZ__` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider fails or the merged configuration is invalid.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::from_figment(
            &Figment::new()
                .merge(Yaml::file(path.as_ref()))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Extract and validate from an already layered [`Figment`].
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        let cfg: Self = figment
            .extract()
            .context("failed to load consent_authz configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the gateway cannot operate with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first empty required value.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session_key.is_empty() {
            anyhow::bail!("session_key must not be empty");
        }
        if self.gate.superuser_role.is_empty() {
            anyhow::bail!("gate.superuser_role must not be empty");
        }
        if self.claims.notes_consent_field.is_empty() {
            anyhow::bail!("claims.notes_consent_field must not be empty");
        }
        Ok(())
    }
}

/// Names of the claims carrying roles and consent grants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClaimSourceConfig {
    /// Token claim with role claims (current layout).
    pub roles_claim: String,

    /// Token claim with consent claims (current layout).
    pub consent_claim: String,

    /// Token claim holding both kinds (legacy layout).
    pub legacy_claim: String,

    /// Field of the user notes document holding consent claims.
    pub notes_consent_field: String,
}

impl Default for ClaimSourceConfig {
    fn default() -> Self {
        Self {
            roles_claim: "fhir_roles".to_owned(),
            consent_claim: "fhir_consent_grants".to_owned(),
            legacy_claim: "fhir".to_owned(),
            notes_consent_field: "fhir_consent_grants".to_owned(),
        }
    }
}
