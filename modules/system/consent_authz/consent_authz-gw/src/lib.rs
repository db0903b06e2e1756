//! Consent `AuthZ` Gateway Module
//!
//! In-process gateway for consent-based authorization. At authentication it
//! derives roles and consent grants from the principal's claims and stores
//! the grants on the session; per request it runs the two-stage gate against
//! those stored grants.
//!
//! The gateway hands out a [`consent_authz_sdk::ConsentGateClient`] for
//! consumption by the host's authentication and request pipelines.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{ClaimSourceConfig, ConsentAuthzGwConfig};
pub use domain::{ConsentAuthzGwLocalClient, InMemorySessionStore};
pub use module::ConsentAuthzGateway;
