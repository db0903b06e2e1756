//! Gate decisions.
//!
//! Each gate stage returns an immutable [`AuthorizationDecision`]; the host
//! maps it onto its own `authorized` / `proceed` / `reject` signals.

use crate::models::Action;

/// Outcome of a gate stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// Access granted; skip any remaining checks.
    Authorized(AuthorizedVia),
    /// Stage 1 admitted the principal; run the per-resource check.
    Proceed,
    /// Access denied.
    Rejected(RejectReason),
}

impl AuthorizationDecision {
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Which rule granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizedVia {
    Superuser,
    /// Blanket `all` grant for the action.
    AllGrant(Action),
    /// Study grants covering the resource's tags (or no tags at all).
    StudyGrant(Action),
}

/// Why access was denied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("principal holds none of the roles required for consent authorization")]
    NoAdmissionRole,

    #[error("unrecognized operation `{0}`")]
    UnrecognizedOperation(String),

    #[error("no consent grants stored for the session")]
    MissingGrantModel,

    #[error("stored consent grants are malformed: {0}")]
    MalformedGrantModel(String),

    #[error("stored consent grants are invalid: {0}")]
    InvalidGrantModel(String),

    #[error("no consent grants for any study")]
    NoGrants,

    #[error("insufficient consent grants to {0} the resource")]
    InsufficientGrants(Action),
}
