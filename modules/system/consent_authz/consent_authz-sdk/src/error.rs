//! Error types for the `consent_authz` module.
//!
//! Denials are not errors: they are returned as
//! [`AuthorizationDecision::Rejected`](crate::AuthorizationDecision::Rejected).
//! These types cover collaborator and infrastructure failures only.

/// Errors returned by [`ConsentGateClient`](crate::ConsentGateClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsentAuthzError {
    #[error("session store failure: {0}")]
    SessionStore(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by a [`SessionDataStore`](crate::SessionDataStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("session store internal error: {0}")]
    Internal(String),
}

/// A [`RoleSink`](crate::RoleSink) refused an authority name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role `{0}` is not recognized")]
pub struct RoleRejected(pub String);
