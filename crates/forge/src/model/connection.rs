//! Durable per-session state.
//!
//! A [`Connection`] is created when a client first subscribes for output and
//! lives until the session disconnects. It is persisted through the store as
//! a [`ConnectionRecord`], whose state fields are plain strings.

use super::state::ConnectionState;
use crate::error::ForgeError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type alias for connection identifiers.
///
/// Connection IDs are assigned once at creation and never change.
pub type ConnectionId = Uuid;

/// Transport-level address used to deliver output to a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionAddress {
    /// Principal name the transport delivers to
    pub username: String,
    /// Transport session identifier
    pub session_id: String,
}

impl SessionAddress {
    pub fn new(username: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            session_id: session_id.into(),
        }
    }
}

/// Server-side state of one client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConnectionRecord", into = "ConnectionRecord")]
pub struct Connection {
    /// Unique, immutable identifier
    pub id: ConnectionId,

    /// Where output for this connection is delivered (None until the
    /// transport handshake finished)
    pub session: Option<SessionAddress>,

    /// Remote address of the client, informational only
    pub remote_address: Option<String>,

    /// Committed display name, set once a character is attached
    pub name: Option<String>,

    /// Current primary and secondary state
    pub state: ConnectionState,

    /// Pending value carried across login steps
    pub scratch: Option<String>,
}

impl Connection {
    /// Creates a fresh connection in the default login state.
    pub fn new(session: Option<SessionAddress>, remote_address: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session,
            remote_address,
            name: None,
            state: ConnectionState::default(),
            scratch: None,
        }
    }

    /// The name prompts should show: the pending one while logging in,
    /// the committed one afterwards.
    pub fn display_name(&self) -> &str {
        self.scratch
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    /// Human readable origin used in audit logs.
    pub fn origin(&self) -> &str {
        self.remote_address.as_deref().unwrap_or("(unknown)")
    }
}

/// Persisted shape of a [`Connection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    pub session_username: Option<String>,
    pub session_id: Option<String>,
    pub remote_address: Option<String>,
    pub name: Option<String>,
    pub primary_state: String,
    pub secondary_state: Option<String>,
    pub scratch: Option<String>,
}

impl From<Connection> for ConnectionRecord {
    fn from(connection: Connection) -> Self {
        ConnectionRecord::from(&connection)
    }
}

impl From<&Connection> for ConnectionRecord {
    fn from(connection: &Connection) -> Self {
        let (primary, secondary) = connection.state.to_parts();
        let (session_username, session_id) = match &connection.session {
            Some(session) => (Some(session.username.clone()), Some(session.session_id.clone())),
            None => (None, None),
        };

        Self {
            id: connection.id,
            session_username,
            session_id,
            remote_address: connection.remote_address.clone(),
            name: connection.name.clone(),
            primary_state: primary.to_string(),
            secondary_state: secondary.map(str::to_string),
            scratch: connection.scratch.clone(),
        }
    }
}

impl TryFrom<ConnectionRecord> for Connection {
    type Error = ForgeError;

    fn try_from(record: ConnectionRecord) -> Result<Self, Self::Error> {
        let state = ConnectionState::from_parts(
            &record.primary_state,
            record.secondary_state.as_deref(),
        )?;

        // Both halves of the address are needed to reach the session.
        let session = match (record.session_username, record.session_id) {
            (Some(username), Some(session_id)) => Some(SessionAddress { username, session_id }),
            _ => None,
        };

        Ok(Self {
            id: record.id,
            session,
            remote_address: record.remote_address,
            name: record.name,
            state,
            scratch: record.scratch,
        })
    }
}
