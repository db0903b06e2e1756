//! Domain layer for the consent authz gateway.

pub mod claim_source;
pub mod error;
pub mod local_client;
pub mod memory_store;
pub mod service;

pub use claim_source::{ClaimSourceError, resolve_claims};
pub use error::DomainError;
pub use local_client::ConsentAuthzGwLocalClient;
pub use memory_store::InMemorySessionStore;
pub use service::Service;
