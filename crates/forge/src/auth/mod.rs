//! Identity verification seam.
//!
//! The interpreter never sees credentials storage. It asks an
//! [`Authenticator`] to verify, create and delete accounts, and to bind or
//! release the session of a connection.

pub mod memory;
pub mod password;

pub use memory::MemoryAuthenticator;
pub use password::{Argon2PasswordEncoder, PasswordEncoder};

use crate::error::ForgeError;
use crate::model::ConnectionId;
use async_trait::async_trait;

/// Failures reported by an [`Authenticator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown name or wrong password
    #[error("Bad credentials")]
    BadCredentials,

    /// An account with this name already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// The backing service failed
    #[error("Authentication backend failure: {0}")]
    Backend(String),
}

impl From<AuthError> for ForgeError {
    fn from(err: AuthError) -> Self {
        ForgeError::Auth(err.to_string())
    }
}

/// Verifies identities and binds them to connections.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Checks `name`/`password` and, on success, binds the session of
    /// `connection_id` to that identity.
    async fn authenticate(
        &self,
        name: &str,
        password: &str,
        connection_id: ConnectionId,
    ) -> Result<(), AuthError>;

    async fn user_exists(&self, name: &str) -> Result<bool, AuthError>;

    /// Registers `name` with an already encoded password.
    async fn create_user(&self, name: &str, encoded_password: &str) -> Result<(), AuthError>;

    async fn delete_user(&self, name: &str) -> Result<(), AuthError>;

    /// Releases any identity bound to `connection_id`. Releasing an unbound
    /// connection is not an error.
    async fn end_session(&self, connection_id: ConnectionId) -> Result<(), AuthError>;
}
