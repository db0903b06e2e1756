//! Collaborator traits implemented by the host session framework.

use async_trait::async_trait;

use crate::error::{RoleRejected, SessionStoreError};

/// Per-session key/value storage for the serialized grant model.
///
/// Written (or cleared) once per authentication, read on every resource check.
#[async_trait]
pub trait SessionDataStore: Send + Sync {
    /// Read the value stored under `key` for `session_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if the store cannot be reached.
    async fn load(&self, session_id: &str, key: &str)
    -> Result<Option<String>, SessionStoreError>;

    /// Write `value` under `key` for `session_id`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if the store cannot be reached.
    async fn store(
        &self,
        session_id: &str,
        key: &str,
        value: String,
    ) -> Result<(), SessionStoreError>;

    /// Drop the value under `key` for `session_id`. Removing an absent key is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if the store cannot be reached.
    async fn remove(&self, session_id: &str, key: &str) -> Result<(), SessionStoreError>;
}

/// Adds authorities to the session being authenticated.
pub trait RoleSink: Send + Sync {
    /// Register `role` on the session.
    ///
    /// # Errors
    ///
    /// Returns [`RoleRejected`] if the host does not know the role. Callers
    /// treat this as non-fatal.
    fn add_authority(&self, role: &str) -> Result<(), RoleRejected>;
}
