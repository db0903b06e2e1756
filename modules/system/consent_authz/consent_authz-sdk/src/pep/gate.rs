//! Two-stage request gate.
//!
//! ```text
//! START ──stage 1──▶ AUTHORIZED | PROCEED | REJECTED
//! PROCEED ─stage 2─▶ AUTHORIZED | REJECTED
//! ```
//!
//! ## Stage 2 (fail-closed)
//!
//! | step | check                              | failure                 |
//! |------|------------------------------------|-------------------------|
//! | 1    | operation maps to an action        | `UnrecognizedOperation` |
//! | 2    | stored grants present and JSON     | `Missing`/`Malformed`   |
//! | 3    | stored grants have the model shape | `InvalidGrantModel`     |
//! | 4    | at least one grant anywhere        | `NoGrants`              |
//! | 5    | `all[action]`                      | (authorized)            |
//! | 6    | study grants cover resource tags   | `InsufficientGrants`    |

use serde::Deserialize;

use crate::decision::{AuthorizationDecision, AuthorizedVia, RejectReason};
use crate::evaluator::{TagMatchMode, is_authorized_with};
use crate::models::{Action, ConsentGrantModel, Principal, ResourceDescriptor, StoredGrantError};
use crate::permission::map_operation_to_action;
use crate::roles::{DEFAULT_ADMISSION_ROLES, ROLE_SUPERUSER};

/// Gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatePolicy {
    /// Role that bypasses consent evaluation entirely.
    pub superuser_role: String,

    /// Roles admitted to stage 2.
    pub admission_roles: Vec<String>,

    /// Denominator used by the study-tag match.
    pub tag_match: TagMatchMode,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            superuser_role: ROLE_SUPERUSER.to_owned(),
            admission_roles: DEFAULT_ADMISSION_ROLES
                .into_iter()
                .map(str::to_owned)
                .collect(),
            tag_match: TagMatchMode::AllTags,
        }
    }
}

/// Stateless decision pipeline. Cheap to clone and safe to share.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    policy: GatePolicy,
}

impl RequestGate {
    #[must_use]
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Stage 1: admit by role.
    #[must_use]
    pub fn admit(&self, principal: &Principal) -> AuthorizationDecision {
        if principal.has_role(&self.policy.superuser_role) {
            return AuthorizationDecision::Authorized(AuthorizedVia::Superuser);
        }
        if principal.has_any_role(&self.policy.admission_roles) {
            return AuthorizationDecision::Proceed;
        }
        AuthorizationDecision::Rejected(RejectReason::NoAdmissionRole)
    }

    /// Stage 2: check one resource against the session's stored grants.
    ///
    /// `stored` is the raw value read from the session store, if any.
    #[must_use]
    pub fn evaluate(
        &self,
        operation: &str,
        stored: Option<&str>,
        resource: &ResourceDescriptor,
    ) -> AuthorizationDecision {
        let Some(action) = map_operation_to_action(operation) else {
            return AuthorizationDecision::Rejected(RejectReason::UnrecognizedOperation(
                operation.to_owned(),
            ));
        };

        let Some(raw) = stored else {
            return AuthorizationDecision::Rejected(RejectReason::MissingGrantModel);
        };

        let model = match ConsentGrantModel::from_stored(raw) {
            Ok(model) => model,
            Err(StoredGrantError::Malformed(e)) => {
                return AuthorizationDecision::Rejected(RejectReason::MalformedGrantModel(
                    e.to_string(),
                ));
            }
            Err(e @ (StoredGrantError::Invalid(_) | StoredGrantError::Decode(_))) => {
                return AuthorizationDecision::Rejected(RejectReason::InvalidGrantModel(
                    e.to_string(),
                ));
            }
        };

        self.evaluate_model(action, &model, resource)
    }

    /// Stage 2 steps 4-6 on an already validated model.
    #[must_use]
    pub fn evaluate_model(
        &self,
        action: Action,
        model: &ConsentGrantModel,
        resource: &ResourceDescriptor,
    ) -> AuthorizationDecision {
        if !model.has_any_grant() {
            return AuthorizationDecision::Rejected(RejectReason::NoGrants);
        }

        if model.all.allows(action) {
            return AuthorizationDecision::Authorized(AuthorizedVia::AllGrant(action));
        }

        if is_authorized_with(model, action, resource, self.policy.tag_match) {
            return AuthorizationDecision::Authorized(AuthorizedVia::StudyGrant(action));
        }

        AuthorizationDecision::Rejected(RejectReason::InsufficientGrants(action))
    }

    /// Run both stages. Stage 2 only runs when stage 1 returns `Proceed`.
    #[must_use]
    pub fn decide(
        &self,
        principal: &Principal,
        operation: &str,
        stored: Option<&str>,
        resource: &ResourceDescriptor,
    ) -> AuthorizationDecision {
        match self.admit(principal) {
            AuthorizationDecision::Proceed => self.evaluate(operation, stored, resource),
            terminal => terminal,
        }
    }
}
