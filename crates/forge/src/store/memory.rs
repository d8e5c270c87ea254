//! DashMap-backed [`Store`].
//!
//! Connections are kept in their persisted string form, the same shape a
//! database row would have, and converted on every read. Creatures are
//! indexed by connection id so the per-line lookup is a point read.

use super::Store;
use crate::error::ForgeError;
use crate::model::{Connection, ConnectionId, ConnectionRecord, Creature, CreatureId};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Persisted shape of a [`Creature`]: the connection is stored by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub id: CreatureId,
    pub name: String,
    pub connection_id: Option<ConnectionId>,
}

impl From<&Creature> for CreatureRecord {
    fn from(creature: &Creature) -> Self {
        Self {
            id: creature.id,
            name: creature.name.clone(),
            connection_id: creature.connection_id(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    connections: DashMap<ConnectionId, ConnectionRecord>,
    creatures: DashMap<CreatureId, CreatureRecord>,
    creatures_by_connection: DashMap<ConnectionId, CreatureId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw record, bypassing the typed conversion. Records written
    /// this way are validated when they are read back.
    pub fn save_connection_record(&self, record: ConnectionRecord) {
        self.connections.insert(record.id, record);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    fn load_connection(&self, id: ConnectionId) -> Result<Option<Connection>, ForgeError> {
        // Clone out so no shard lock is held during conversion.
        let record = self.connections.get(&id).map(|entry| entry.value().clone());
        record.map(Connection::try_from).transpose()
    }

    fn join(&self, record: CreatureRecord) -> Result<Creature, ForgeError> {
        let connection = match record.connection_id {
            Some(connection_id) => self.load_connection(connection_id)?,
            None => None,
        };

        Ok(Creature {
            id: record.id,
            name: record.name,
            connection,
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_connection(&self, connection: &Connection) -> Result<(), ForgeError> {
        self.connections
            .insert(connection.id, ConnectionRecord::from(connection));
        Ok(())
    }

    async fn find_connection_by_id(
        &self,
        id: ConnectionId,
    ) -> Result<Option<Connection>, ForgeError> {
        self.load_connection(id)
    }

    async fn delete_connection(&self, id: ConnectionId) -> Result<(), ForgeError> {
        self.connections.remove(&id);
        Ok(())
    }

    async fn save_creature(&self, creature: &Creature) -> Result<(), ForgeError> {
        let record = CreatureRecord::from(creature);

        if let Some(connection_id) = record.connection_id {
            let holder = self
                .creatures_by_connection
                .get(&connection_id)
                .map(|entry| *entry.value());
            if let Some(holder) = holder.filter(|holder| *holder != record.id) {
                return Err(ForgeError::Store(format!(
                    "Connection {} is already used by Creature {}",
                    connection_id, holder
                )));
            }
        }

        let previous = self.creatures.insert(record.id, record.clone());

        // Drop the old index entry if the creature moved off a connection.
        if let Some(old_connection) = previous.and_then(|previous| previous.connection_id) {
            if Some(old_connection) != record.connection_id {
                self.creatures_by_connection.remove(&old_connection);
            }
        }

        if let Some(connection_id) = record.connection_id {
            self.creatures_by_connection.insert(connection_id, record.id);
        }

        Ok(())
    }

    async fn find_creature_by_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<Creature>, ForgeError> {
        let Some(creature_id) = self
            .creatures_by_connection
            .get(&connection_id)
            .map(|entry| *entry.value())
        else {
            return Ok(None);
        };

        let record = self.creatures.get(&creature_id).map(|entry| entry.value().clone());
        record.map(|record| self.join(record)).transpose()
    }

    async fn find_all_connected_creatures(&self) -> Result<Vec<Creature>, ForgeError> {
        let records: Vec<CreatureRecord> = self
            .creatures
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .connection_id
                    .is_some_and(|connection_id| self.connections.contains_key(&connection_id))
            })
            .map(|entry| entry.value().clone())
            .collect();

        let creatures = records
            .into_iter()
            .filter_map(|record| {
                let creature_id = record.id;
                match self.join(record) {
                    Ok(creature) => Some(creature),
                    Err(e) => {
                        error!("Skipping Creature {} with unreadable Connection: {}", creature_id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(creatures)
    }

    async fn delete_creature(&self, id: CreatureId) -> Result<(), ForgeError> {
        if let Some((_, record)) = self.creatures.remove(&id) {
            if let Some(connection_id) = record.connection_id {
                self.creatures_by_connection.remove(&connection_id);
            }
        }
        Ok(())
    }

    async fn delete_creature_by_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<CreatureId>, ForgeError> {
        let Some((_, creature_id)) = self.creatures_by_connection.remove(&connection_id) else {
            return Ok(None);
        };

        self.creatures.remove(&creature_id);
        Ok(Some(creature_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionState, SessionAddress};

    fn connection() -> Connection {
        Connection::new(Some(SessionAddress::new("user", "session")), None)
    }

    #[tokio::test]
    async fn test_connection_crud() {
        let store = MemoryStore::new();
        let mut connection = connection();

        store.save_connection(&connection).await.unwrap();
        connection.state = ConnectionState::InGame;
        store.save_connection(&connection).await.unwrap();

        let found = store.find_connection_by_id(connection.id).await.unwrap();
        assert_eq!(found, Some(connection.clone()));

        store.delete_connection(connection.id).await.unwrap();
        assert!(store.find_connection_by_id(connection.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_persisted_state_fails_on_read() {
        let store = MemoryStore::new();
        let mut record = ConnectionRecord::from(&connection());
        record.primary_state = "NOWHERE".to_string();
        let id = record.id;
        store.save_connection_record(record);

        assert!(matches!(
            store.find_connection_by_id(id).await,
            Err(ForgeError::UnknownState { .. })
        ));
    }

    #[tokio::test]
    async fn test_creature_joined_with_live_connection() {
        let store = MemoryStore::new();
        let mut connection = connection();
        store.save_connection(&connection).await.unwrap();
        let creature = Creature::new("Dani", Some(connection.clone()));
        store.save_creature(&creature).await.unwrap();

        connection.name = Some("Dani".to_string());
        store.save_connection(&connection).await.unwrap();

        let found = store
            .find_creature_by_connection(connection.id)
            .await
            .unwrap()
            .expect("creature should be indexed by connection");
        assert_eq!(found, creature);
        assert_eq!(found.connection, Some(connection));
    }

    #[tokio::test]
    async fn test_connected_creatures_skip_missing_connections() {
        let store = MemoryStore::new();
        let live = connection();
        store.save_connection(&live).await.unwrap();
        let online = Creature::new("Dani", Some(live));
        let orphan = Creature::new("Scion", Some(connection()));
        let offline = Creature::new("Tess", None);

        for creature in [&online, &orphan, &offline] {
            store.save_creature(creature).await.unwrap();
        }

        let connected = store.find_all_connected_creatures().await.unwrap();
        assert_eq!(connected, vec![online]);
    }

    #[tokio::test]
    async fn test_listing_skips_unreadable_connections() {
        let store = MemoryStore::new();
        let good = connection();
        let bad = connection();
        store.save_connection(&good).await.unwrap();
        store.save_connection(&bad).await.unwrap();
        let online = Creature::new("Dani", Some(good));
        let broken = Creature::new("Tess", Some(bad.clone()));
        store.save_creature(&online).await.unwrap();
        store.save_creature(&broken).await.unwrap();

        let mut record = ConnectionRecord::from(&bad);
        record.primary_state = "NOWHERE".to_string();
        store.save_connection_record(record);

        let connected = store.find_all_connected_creatures().await.unwrap();
        assert_eq!(connected, vec![online]);
    }

    #[tokio::test]
    async fn test_delete_creature_by_connection() {
        let store = MemoryStore::new();
        let connection = connection();
        store.save_connection(&connection).await.unwrap();
        let creature = Creature::new("Dani", Some(connection.clone()));
        store.save_creature(&creature).await.unwrap();

        let deleted = store.delete_creature_by_connection(connection.id).await.unwrap();

        assert_eq!(deleted, Some(creature.id));
        assert_eq!(store.creature_count(), 0);
        assert_eq!(store.delete_creature_by_connection(connection.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_one_creature_per_connection() {
        let store = MemoryStore::new();
        let connection = connection();
        store.save_connection(&connection).await.unwrap();

        let first = Creature::new("Dani", Some(connection.clone()));
        store.save_creature(&first).await.unwrap();
        // Saving the same creature again is fine.
        store.save_creature(&first).await.unwrap();

        let second = Creature::new("Scion", Some(connection));
        assert!(matches!(
            store.save_creature(&second).await,
            Err(ForgeError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_creature_clears_index() {
        let store = MemoryStore::new();
        let connection = connection();
        store.save_connection(&connection).await.unwrap();
        let creature = Creature::new("Dani", Some(connection.clone()));
        store.save_creature(&creature).await.unwrap();

        store.delete_creature(creature.id).await.unwrap();

        assert!(store
            .find_creature_by_connection(connection.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.creature_count(), 0);
    }
}
