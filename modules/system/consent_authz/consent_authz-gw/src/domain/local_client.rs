//! Local (in-process) client for the consent authz gateway.

use std::sync::Arc;

use async_trait::async_trait;
use consent_authz_sdk::{
    AuthenticationContext, AuthenticationOutcome, AuthorizationDecision, ConsentAuthzError,
    ConsentGateClient, Principal, ResourceDescriptor, RoleSink,
};

use super::{DomainError, Service};

/// Local client wrapping the gateway service.
///
/// Handed out by [`ConsentAuthzGateway::client`](crate::module::ConsentAuthzGateway::client).
pub struct ConsentAuthzGwLocalClient {
    svc: Arc<Service>,
}

impl ConsentAuthzGwLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> ConsentAuthzError {
    tracing::error!(operation = op, error = ?e, "consent_authz gateway call failed");
    e.into()
}

#[async_trait]
impl ConsentGateClient for ConsentAuthzGwLocalClient {
    async fn on_authenticate_success(
        &self,
        principal: &Principal,
        context: &AuthenticationContext,
        roles: &dyn RoleSink,
    ) -> Result<AuthenticationOutcome, ConsentAuthzError> {
        self.svc
            .on_authenticate_success(principal, context, roles)
            .await
            .map_err(|e| log_and_convert("on_authenticate_success", e))
    }

    async fn start_operation(
        &self,
        principal: &Principal,
    ) -> Result<AuthorizationDecision, ConsentAuthzError> {
        Ok(self.svc.start_operation(principal))
    }

    async fn can_see_resource(
        &self,
        principal: &Principal,
        operation: &str,
        resource: &ResourceDescriptor,
    ) -> Result<AuthorizationDecision, ConsentAuthzError> {
        self.svc
            .can_see_resource(principal, operation, resource)
            .await
            .map_err(|e| log_and_convert("can_see_resource", e))
    }
}
