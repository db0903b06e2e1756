//! In-process session data store.

use async_trait::async_trait;
use consent_authz_sdk::{SessionDataStore, SessionStoreError};
use dashmap::DashMap;

/// [`SessionDataStore`] backed by a concurrent map keyed by `(session_id, key)`.
///
/// Suitable for single-node deployments and tests.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: DashMap<(String, String), String>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every value stored for `session_id`.
    pub fn remove_session(&self, session_id: &str) {
        self.entries.retain(|(sid, _), _| sid != session_id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SessionDataStore for InMemorySessionStore {
    async fn load(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<String>, SessionStoreError> {
        Ok(self
            .entries
            .get(&(session_id.to_owned(), key.to_owned()))
            .map(|entry| entry.value().clone()))
    }

    async fn store(
        &self,
        session_id: &str,
        key: &str,
        value: String,
    ) -> Result<(), SessionStoreError> {
        self.entries
            .insert((session_id.to_owned(), key.to_owned()), value);
        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> Result<(), SessionStoreError> {
        self.entries
            .remove(&(session_id.to_owned(), key.to_owned()));
        Ok(())
    }
}
