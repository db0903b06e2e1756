//! Domain errors for the consent authz gateway.

use consent_authz_sdk::{ConsentAuthzError, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    SessionStore(#[from] SessionStoreError),

    #[error("failed to serialize consent grants: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl From<DomainError> for ConsentAuthzError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::SessionStore(e) => Self::SessionStore(e.to_string()),
            DomainError::Serialize(e) => Self::Internal(e.to_string()),
        }
    }
}
