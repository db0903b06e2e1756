//! Well-known authorities and role-claim normalization.

use crate::claims::{FHIR_CLAIM_PREFIX, FHIR_ROLE_CLAIM_PREFIX};

/// Full bypass of consent checks.
pub const ROLE_SUPERUSER: &str = "ROLE_SUPERUSER";
pub const ROLE_FHIR_CLIENT_SUPERUSER: &str = "ROLE_FHIR_CLIENT_SUPERUSER";
pub const ROLE_FHIR_CLIENT_SUPERUSER_RO: &str = "ROLE_FHIR_CLIENT_SUPERUSER_RO";
pub const FHIR_ALL_READ: &str = "FHIR_ALL_READ";
pub const FHIR_ALL_WRITE: &str = "FHIR_ALL_WRITE";
pub const FHIR_ALL_DELETE: &str = "FHIR_ALL_DELETE";

/// Roles admitted to per-resource consent evaluation.
pub const DEFAULT_ADMISSION_ROLES: [&str; 5] = [
    ROLE_FHIR_CLIENT_SUPERUSER,
    ROLE_FHIR_CLIENT_SUPERUSER_RO,
    FHIR_ALL_READ,
    FHIR_ALL_WRITE,
    FHIR_ALL_DELETE,
];

/// Turn a role claim into an authority name.
///
/// `fhir-role-fhir-client-superuser` becomes `ROLE_FHIR_CLIENT_SUPERUSER`:
/// the leading `fhir-` is dropped, dashes become underscores, and the
/// result is upper-cased. Returns `None` for claims that are not role claims.
#[must_use]
pub fn role_from_claim(claim: &str) -> Option<String> {
    if !claim.starts_with(FHIR_ROLE_CLAIM_PREFIX) {
        return None;
    }
    let name = claim.strip_prefix(FHIR_CLAIM_PREFIX)?;
    Some(name.replace('-', "_").to_uppercase())
}

/// Authority names for every role claim in `claims`, in order.
#[must_use]
pub fn roles_from_claims<I, S>(claims: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    claims
        .into_iter()
        .filter_map(|claim| role_from_claim(claim.as_ref()))
        .collect()
}
