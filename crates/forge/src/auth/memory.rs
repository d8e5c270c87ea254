//! In-memory account registry.

use super::{AuthError, Authenticator, PasswordEncoder};
use crate::model::ConnectionId;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Accounts and session bindings kept in concurrent maps.
pub struct MemoryAuthenticator {
    encoder: Arc<dyn PasswordEncoder>,
    /// name -> encoded password
    accounts: DashMap<String, String>,
    /// connection -> bound name
    sessions: DashMap<ConnectionId, String>,
}

impl MemoryAuthenticator {
    pub fn new(encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self {
            encoder,
            accounts: DashMap::new(),
            sessions: DashMap::new(),
        }
    }

    /// Name bound to a connection, if any.
    pub fn bound_name(&self, connection_id: ConnectionId) -> Option<String> {
        self.sessions
            .get(&connection_id)
            .map(|entry| entry.value().clone())
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl std::fmt::Debug for MemoryAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAuthenticator")
            .field("accounts", &self.accounts.len())
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

#[async_trait]
impl Authenticator for MemoryAuthenticator {
    async fn authenticate(
        &self,
        name: &str,
        password: &str,
        connection_id: ConnectionId,
    ) -> Result<(), AuthError> {
        // Clone out so the shard is not locked while the hash is verified.
        let encoded = self.accounts.get(name).map(|entry| entry.value().clone());
        let verified = encoded.is_some_and(|encoded| self.encoder.matches(password, &encoded));

        if !verified {
            return Err(AuthError::BadCredentials);
        }

        self.sessions.insert(connection_id, name.to_string());
        debug!("Bound connection {} to {}", connection_id, name);
        Ok(())
    }

    async fn user_exists(&self, name: &str) -> Result<bool, AuthError> {
        Ok(self.accounts.contains_key(name))
    }

    async fn create_user(&self, name: &str, encoded_password: &str) -> Result<(), AuthError> {
        match self.accounts.entry(name.to_string()) {
            Entry::Occupied(_) => Err(AuthError::UserExists(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(encoded_password.to_string());
                Ok(())
            }
        }
    }

    async fn delete_user(&self, name: &str) -> Result<(), AuthError> {
        self.accounts.remove(name);
        Ok(())
    }

    async fn end_session(&self, connection_id: ConnectionId) -> Result<(), AuthError> {
        if let Some((_, name)) = self.sessions.remove(&connection_id) {
            debug!("Released binding of connection {} to {}", connection_id, name);
        }
        Ok(())
    }
}
