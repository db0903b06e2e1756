//! Public API trait for the consent authorization gateway.

use async_trait::async_trait;

use crate::decision::AuthorizationDecision;
use crate::error::ConsentAuthzError;
use crate::models::{AuthenticationContext, AuthenticationOutcome, Principal, ResourceDescriptor};
use crate::ports::RoleSink;

/// Public API trait for the consent authorization gateway.
///
/// The host calls [`on_authenticate_success`](Self::on_authenticate_success)
/// once per authentication, then the two gate stages per request:
///
/// ```ignore
/// let decision = gate.start_operation(&principal).await?;
/// if decision == AuthorizationDecision::Proceed {
///     let decision = gate.can_see_resource(&principal, "GET", &resource).await?;
/// }
/// ```
#[async_trait]
pub trait ConsentGateClient: Send + Sync {
    /// Derive roles and consent grants from the principal's claims and store
    /// the grants on the session.
    ///
    /// # Errors
    ///
    /// - `SessionStore` if the grants cannot be written
    /// - `Internal` for unexpected errors
    async fn on_authenticate_success(
        &self,
        principal: &Principal,
        context: &AuthenticationContext,
        roles: &dyn RoleSink,
    ) -> Result<AuthenticationOutcome, ConsentAuthzError>;

    /// Stage 1: role-based admission.
    ///
    /// # Errors
    ///
    /// - `Internal` for unexpected errors
    async fn start_operation(
        &self,
        principal: &Principal,
    ) -> Result<AuthorizationDecision, ConsentAuthzError>;

    /// Stage 2: per-resource consent check against the session's grants.
    ///
    /// # Errors
    ///
    /// - `SessionStore` if the grants cannot be read
    /// - `Internal` for unexpected errors
    async fn can_see_resource(
        &self,
        principal: &Principal,
        operation: &str,
        resource: &ResourceDescriptor,
    ) -> Result<AuthorizationDecision, ConsentAuthzError>;
}
