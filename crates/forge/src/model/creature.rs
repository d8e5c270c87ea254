//! In-world characters.

use super::connection::{Connection, ConnectionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CreatureId = Uuid;

/// A player's character, linked to at most one live connection.
///
/// `connection` is a snapshot of the linked connection as the store saw it
/// when the creature was read. Creatures compare by `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub connection: Option<Connection>,
}

impl Creature {
    pub fn new(name: impl Into<String>, connection: Option<Connection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            connection,
        }
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(|connection| connection.id)
    }

    /// Whether output can currently be delivered to this creature.
    pub fn is_reachable(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| connection.session.is_some())
    }
}

impl PartialEq for Creature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Creature {}
