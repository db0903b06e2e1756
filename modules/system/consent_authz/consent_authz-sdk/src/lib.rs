//! Consent `AuthZ` SDK
//!
//! This crate provides the public API for the `consent_authz` module:
//!
//! - [`ConsentGateClient`] - Public API trait for consumers
//! - [`SessionDataStore`], [`RoleSink`] - Collaborators provided by the host
//! - [`ConsentGrantModel`], [`ResourceDescriptor`], [`Principal`] - Core models
//! - [`claims`] - Consent claim parsing and grant model construction
//! - [`validation`] - Structural validation of untrusted grant models
//! - [`evaluator`] - Per-resource study-tag evaluation
//! - [`pep`] - Two-stage request gate
//! - [`ConsentAuthzError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use consent_authz_sdk::{AuthorizationDecision, ConsentGateClient};
//!
//! let gate: Arc<dyn ConsentGateClient> = /* built by the gateway module */;
//!
//! gate.on_authenticate_success(&principal, &context, &role_sink).await?;
//!
//! match gate.start_operation(&principal).await? {
//!     AuthorizationDecision::Proceed => {
//!         gate.can_see_resource(&principal, "GET", &resource).await?
//!     }
//!     terminal => terminal,
//! };
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod claims;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod pep;
pub mod permission;
pub mod ports;
pub mod roles;
pub mod validation;

// Re-export main types at crate root
pub use api::ConsentGateClient;
pub use claims::{
    ClaimParseError, ConsentClaim, EntityType, FhirClaims, build_consent_grant_model,
    parse_consent_claim,
};
pub use decision::{AuthorizationDecision, AuthorizedVia, RejectReason};
pub use error::{ConsentAuthzError, RoleRejected, SessionStoreError};
pub use evaluator::{TagMatchMode, is_authorized, is_authorized_with};
pub use models::{
    Action, ActionSet, AuthenticationContext, AuthenticationOutcome, ConsentGrantModel,
    GrantScope, Principal, ResourceDescriptor, STUDY_TAG_SYSTEM, StoredGrantError, StudyId, Tag,
    UnknownAction,
};
pub use permission::map_operation_to_action;
pub use ports::{RoleSink, SessionDataStore};
pub use validation::{GrantModelError, is_valid_consent_grant_model, validate_consent_grant_model};
