//! Persistence seam for connections and creatures.

pub mod memory;

pub use memory::{CreatureRecord, MemoryStore};

use crate::error::ForgeError;
use crate::model::{Connection, ConnectionId, Creature, CreatureId};
use async_trait::async_trait;

/// Record storage used by the interpreter and the session service.
///
/// Creatures come back with their live connection joined in, so callers can
/// reach a creature's session without a second lookup.
#[async_trait]
pub trait Store: Send + Sync {
    async fn save_connection(&self, connection: &Connection) -> Result<(), ForgeError>;

    async fn find_connection_by_id(
        &self,
        id: ConnectionId,
    ) -> Result<Option<Connection>, ForgeError>;

    async fn delete_connection(&self, id: ConnectionId) -> Result<(), ForgeError>;

    async fn save_creature(&self, creature: &Creature) -> Result<(), ForgeError>;

    async fn find_creature_by_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<Creature>, ForgeError>;

    /// Every creature that currently references a stored connection.
    ///
    /// A creature whose connection cannot be read is left out and logged;
    /// one bad record never hides the rest.
    async fn find_all_connected_creatures(&self) -> Result<Vec<Creature>, ForgeError>;

    async fn delete_creature(&self, id: CreatureId) -> Result<(), ForgeError>;

    /// Deletes whichever creature uses `connection_id`, without reading the
    /// connection. Returns the id of the deleted creature.
    async fn delete_creature_by_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<CreatureId>, ForgeError>;
}
