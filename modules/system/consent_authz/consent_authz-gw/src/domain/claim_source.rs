//! Resolve FHIR claims from the authentication context.
//!
//! | context              | layout                                   | roles | consents |
//! |----------------------|------------------------------------------|-------|----------|
//! | `TokenBased`         | `roles_claim` + `consent_claim` arrays   | yes   | yes      |
//! | `TokenBased`         | single `legacy_claim` array (fallback)   | yes   | yes      |
//! | `SessionNotesBased`  | `{"<notes_consent_field>": [...]}`       | no    | yes      |
//! | `SessionNotesBased`  | bare `[...]`                             | no    | yes      |
//!
//! Non-string entries are ignored.

use consent_authz_sdk::{AuthenticationContext, FhirClaims};
use serde_json::{Map, Value};

use crate::config::ClaimSourceConfig;

/// Failure to obtain a claim list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimSourceError {
    #[error("token carries no `{0}` claim list")]
    MissingClaim(String),

    #[error("session notes are not valid JSON: {0}")]
    MalformedNotes(String),

    #[error("session notes have no `{0}` claim list")]
    MissingNotesField(String),

    #[error("session notes are neither an object nor an array")]
    UnexpectedNotesShape,
}

impl ClaimSourceError {
    /// Message reported to the host as the authentication failure.
    #[must_use]
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::MissingClaim(_) => "Failed to extract consent authorizations from access token",
            Self::MalformedNotes(_) | Self::MissingNotesField(_) | Self::UnexpectedNotesShape => {
                "Failed to extract consent authorizations from user session"
            }
        }
    }
}

/// Pick the claim lists for `context` according to `cfg`.
///
/// # Errors
///
/// Returns a [`ClaimSourceError`] if no usable claim list is present.
pub fn resolve_claims(
    cfg: &ClaimSourceConfig,
    context: &AuthenticationContext,
) -> Result<FhirClaims, ClaimSourceError> {
    match context {
        AuthenticationContext::TokenBased { claims } => from_token(cfg, claims),
        AuthenticationContext::SessionNotesBased { notes } => from_notes(cfg, notes),
    }
}

fn from_token(
    cfg: &ClaimSourceConfig,
    claims: &Map<String, Value>,
) -> Result<FhirClaims, ClaimSourceError> {
    let roles = claims.get(&cfg.roles_claim).and_then(Value::as_array);
    let consents = claims.get(&cfg.consent_claim).and_then(Value::as_array);

    if let (Some(roles), Some(consents)) = (roles, consents) {
        return Ok(FhirClaims::from_parts(
            string_entries(roles),
            string_entries(consents),
        ));
    }

    let legacy = claims
        .get(&cfg.legacy_claim)
        .and_then(Value::as_array)
        .ok_or_else(|| ClaimSourceError::MissingClaim(cfg.legacy_claim.clone()))?;
    Ok(FhirClaims::classify(string_entries(legacy)))
}

fn from_notes(cfg: &ClaimSourceConfig, notes: &str) -> Result<FhirClaims, ClaimSourceError> {
    let doc: Value =
        serde_json::from_str(notes).map_err(|e| ClaimSourceError::MalformedNotes(e.to_string()))?;

    let consents = match &doc {
        Value::Object(map) => map
            .get(&cfg.notes_consent_field)
            .and_then(Value::as_array)
            .ok_or_else(|| ClaimSourceError::MissingNotesField(cfg.notes_consent_field.clone()))?,
        Value::Array(entries) => entries,
        _ => return Err(ClaimSourceError::UnexpectedNotesShape),
    };

    Ok(FhirClaims::from_parts(Vec::new(), string_entries(consents)))
}

fn string_entries(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}
