//! Consent claim parsing.
//!
//! Wire format of a consent claim:
//!
//! ```text
//! fhir-consent-<action>-<entity_type>|<identifier>
//! ```
//!
//! `<action>` is one of `read`, `write`, `delete`. `<identifier>` contains no
//! `|` and is either the reserved `all` or an opaque study id. Claims that
//! break the grammar are rejected; nothing is silently written into the grant model.

use std::str::FromStr;

use crate::models::{Action, ConsentGrantModel, GrantScope};

/// Prefix shared by every FHIR claim.
pub const FHIR_CLAIM_PREFIX: &str = "fhir-";

/// Prefix of consent grant claims.
pub const FHIR_CONSENT_CLAIM_PREFIX: &str = "fhir-consent-";

/// Prefix of role claims.
pub const FHIR_ROLE_CLAIM_PREFIX: &str = "fhir-role-";

/// Entity type named by a consent claim.
///
/// Only `study` carries meaning today. Other values are kept so that new
/// entity scopes can be introduced without changing the claim grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityType {
    Study,
    Other(String),
}

impl EntityType {
    fn parse(raw: &str) -> Self {
        if raw == "study" {
            EntityType::Study
        } else {
            EntityType::Other(raw.to_owned())
        }
    }
}

/// A parsed consent claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentClaim {
    pub action: Action,
    pub entity_type: EntityType,
    pub scope: GrantScope,
}

/// A consent claim that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimParseError {
    #[error("claim `{claim}` does not start with `fhir-consent-`")]
    MissingPrefix { claim: String },

    #[error("claim `{claim}` has no `|` before its identifier")]
    MissingIdentifier { claim: String },

    #[error("claim `{claim}` has more than one `|`")]
    ExtraSeparator { claim: String },

    #[error("claim `{claim}` has an empty identifier")]
    EmptyIdentifier { claim: String },

    #[error("claim `{claim}` has no entity type after its action")]
    MissingEntityType { claim: String },

    #[error("claim `{claim}` has unknown action `{action}`")]
    UnknownAction { claim: String, action: String },
}

impl FromStr for ConsentClaim {
    type Err = ClaimParseError;

    fn from_str(claim: &str) -> Result<Self, Self::Err> {
        parse_consent_claim(claim)
    }
}

/// Parse a single consent claim.
///
/// # Errors
///
/// Returns a [`ClaimParseError`] naming the first grammar violation.
pub fn parse_consent_claim(claim: &str) -> Result<ConsentClaim, ClaimParseError> {
    let body = claim
        .strip_prefix(FHIR_CONSENT_CLAIM_PREFIX)
        .ok_or_else(|| ClaimParseError::MissingPrefix {
            claim: claim.to_owned(),
        })?;

    let (key, identifier) = body
        .split_once('|')
        .ok_or_else(|| ClaimParseError::MissingIdentifier {
            claim: claim.to_owned(),
        })?;
    if identifier.contains('|') {
        return Err(ClaimParseError::ExtraSeparator {
            claim: claim.to_owned(),
        });
    }
    if identifier.is_empty() {
        return Err(ClaimParseError::EmptyIdentifier {
            claim: claim.to_owned(),
        });
    }

    let (action, entity_type) = match key.split_once('-') {
        Some((action, entity_type)) if !entity_type.is_empty() => (action, entity_type),
        _ => {
            return Err(ClaimParseError::MissingEntityType {
                claim: claim.to_owned(),
            });
        }
    };

    let action = action
        .parse::<Action>()
        .map_err(|e| ClaimParseError::UnknownAction {
            claim: claim.to_owned(),
            action: e.0,
        })?;

    Ok(ConsentClaim {
        action,
        entity_type: EntityType::parse(entity_type),
        scope: GrantScope::from_identifier(identifier),
    })
}

/// Build a grant model from consent claims.
///
/// Callers filter claims by [`FHIR_CONSENT_CLAIM_PREFIX`] first (see
/// [`FhirClaims`]). Repeated claims are idempotent.
///
/// # Errors
///
/// Fails on the first claim that does not parse; no partial model is returned.
pub fn build_consent_grant_model<I, S>(claims: I) -> Result<ConsentGrantModel, ClaimParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut model = ConsentGrantModel::default();
    for claim in claims {
        let parsed = parse_consent_claim(claim.as_ref())?;
        model.grant(parsed.action, &parsed.scope);
    }
    Ok(model)
}

/// FHIR claims split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FhirClaims {
    pub role_claims: Vec<String>,
    pub consent_claims: Vec<String>,
}

impl FhirClaims {
    /// Split a mixed claim list by prefix. Claims of neither kind are dropped.
    #[must_use]
    pub fn classify<I, S>(claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Self::default();
        for claim in claims {
            let claim = claim.into();
            if claim.starts_with(FHIR_CONSENT_CLAIM_PREFIX) {
                out.consent_claims.push(claim);
            } else if claim.starts_with(FHIR_ROLE_CLAIM_PREFIX) {
                out.role_claims.push(claim);
            }
        }
        out
    }

    /// Build from separately delivered role and consent lists, keeping only
    /// claims with the matching prefix in each.
    #[must_use]
    pub fn from_parts<R, C>(role_claims: R, consent_claims: C) -> Self
    where
        R: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        Self {
            role_claims: role_claims
                .into_iter()
                .filter(|c| c.starts_with(FHIR_ROLE_CLAIM_PREFIX))
                .collect(),
            consent_claims: consent_claims
                .into_iter()
                .filter(|c| c.starts_with(FHIR_CONSENT_CLAIM_PREFIX))
                .collect(),
        }
    }
}
