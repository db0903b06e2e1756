//! Session-backed consent gate service.
//!
//! Derives the grant model once per authentication and stores it on the
//! session; every later resource check reads it back through the
//! [`RequestGate`].

use std::sync::Arc;

use consent_authz_sdk::pep::RequestGate;
use consent_authz_sdk::roles::roles_from_claims;
use consent_authz_sdk::{
    AuthenticationContext, AuthenticationOutcome, AuthorizationDecision, Principal, RejectReason,
    ResourceDescriptor, RoleSink, SessionDataStore, build_consent_grant_model,
};
use tracing::{error, info, warn};

use super::DomainError;
use super::claim_source::resolve_claims;
use crate::config::{ClaimSourceConfig, ConsentAuthzGwConfig};

/// Failure message when a consent claim does not parse.
pub const CLAIM_PARSE_FAILURE: &str = "Failed to parse consent authorizations";

/// Consent gate service.
pub struct Service {
    gate: RequestGate,
    claims: ClaimSourceConfig,
    session_key: String,
    store: Arc<dyn SessionDataStore>,
}

impl Service {
    #[must_use]
    pub fn new(cfg: ConsentAuthzGwConfig, store: Arc<dyn SessionDataStore>) -> Self {
        Self {
            gate: RequestGate::new(cfg.gate),
            claims: cfg.claims,
            session_key: cfg.session_key,
            store,
        }
    }

    #[must_use]
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Derive roles and grants for a freshly authenticated principal.
    ///
    /// Claim problems are reported as [`AuthenticationOutcome::Failure`];
    /// only collaborator failures are errors. Any outcome other than
    /// `Authenticated` leaves no grants on the session, and roles are only
    /// registered once the grant model has been built.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] if the grants cannot be serialized, stored or
    /// cleared.
    #[tracing::instrument(skip_all, fields(session_id = %principal.session_id))]
    pub async fn on_authenticate_success(
        &self,
        principal: &Principal,
        context: &AuthenticationContext,
        roles: &dyn RoleSink,
    ) -> Result<AuthenticationOutcome, DomainError> {
        if principal.has_role(&self.gate.policy().superuser_role) {
            info!("Superuser authenticated, skipping consent derivation");
            self.clear_grants(principal).await?;
            return Ok(AuthenticationOutcome::Bypassed);
        }

        let claims = match resolve_claims(&self.claims, context) {
            Ok(claims) => claims,
            Err(e) => {
                error!(error = %e, "Could not extract FHIR claims");
                self.clear_grants(principal).await?;
                return Ok(AuthenticationOutcome::Failure {
                    message: e.failure_message().to_owned(),
                });
            }
        };

        let grants = match build_consent_grant_model(&claims.consent_claims) {
            Ok(grants) => grants,
            Err(e) => {
                error!(error = %e, "Malformed consent claim");
                self.clear_grants(principal).await?;
                return Ok(AuthenticationOutcome::Failure {
                    message: CLAIM_PARSE_FAILURE.to_owned(),
                });
            }
        };

        let roles_added = register_roles(&claims.role_claims, roles);

        let raw = grants.to_stored().map_err(DomainError::Serialize)?;
        self.store
            .store(&principal.session_id, &self.session_key, raw)
            .await?;
        info!(
            consent_grants = ?grants,
            roles_added = roles_added.len(),
            "Added consent grants to user session"
        );

        Ok(AuthenticationOutcome::Authenticated {
            roles_added,
            grants,
        })
    }

    /// Drop grants left by an earlier authentication of the same session.
    async fn clear_grants(&self, principal: &Principal) -> Result<(), DomainError> {
        self.store
            .remove(&principal.session_id, &self.session_key)
            .await?;
        Ok(())
    }

    /// Stage 1.
    #[must_use]
    #[tracing::instrument(skip_all, fields(session_id = %principal.session_id))]
    pub fn start_operation(&self, principal: &Principal) -> AuthorizationDecision {
        let decision = self.gate.admit(principal);
        log_decision(&decision);
        decision
    }

    /// Stage 2 against the grants stored for the principal's session.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] if the session store cannot be read.
    #[tracing::instrument(
        skip_all,
        fields(session_id = %principal.session_id, operation = %operation, resource = %resource)
    )]
    pub async fn can_see_resource(
        &self,
        principal: &Principal,
        operation: &str,
        resource: &ResourceDescriptor,
    ) -> Result<AuthorizationDecision, DomainError> {
        let stored = self
            .store
            .load(&principal.session_id, &self.session_key)
            .await?;
        let decision = self.gate.evaluate(operation, stored.as_deref(), resource);
        log_decision(&decision);
        Ok(decision)
    }
}

fn register_roles(role_claims: &[String], sink: &dyn RoleSink) -> Vec<String> {
    let mut added = Vec::new();
    for role in roles_from_claims(role_claims) {
        match sink.add_authority(&role) {
            Ok(()) => {
                info!(role = %role, "Added role to user session");
                added.push(role);
            }
            Err(e) => warn!(role = %role, error = %e, "Unrecognized role, skipping"),
        }
    }
    added
}

fn log_decision(decision: &AuthorizationDecision) {
    match decision {
        AuthorizationDecision::Authorized(via) => info!(via = ?via, "Access authorized"),
        AuthorizationDecision::Proceed => info!("Admitted, proceeding to consent check"),
        AuthorizationDecision::Rejected(
            reason @ (RejectReason::MalformedGrantModel(_) | RejectReason::InvalidGrantModel(_)),
        ) => error!(reason = %reason, "Access rejected"),
        AuthorizationDecision::Rejected(reason) => info!(reason = %reason, "Access rejected"),
    }
}
