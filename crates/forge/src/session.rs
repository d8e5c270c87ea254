//! Transport-facing entry points.
//!
//! [`ForgeService`] is what a transport talks to: it creates the connection
//! record when a session subscribes, runs each input line as a small
//! transaction against the store, and cleans up on disconnect.

use crate::auth::Authenticator;
use crate::error::ForgeError;
use crate::interpret::{Interpreter, PrimaryInterpreter};
use crate::model::{Connection, ConnectionId, SessionAddress};
use crate::output::{Output, SOMETHING_WENT_WRONG};
use crate::store::Store;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, trace};

pub struct ForgeService {
    store: Arc<dyn Store>,
    authenticator: Arc<dyn Authenticator>,
    interpreter: PrimaryInterpreter,
    greeting: Vec<String>,
    /// Serializes lines of one connection; different connections never share a lock
    locks: DashMap<ConnectionId, Arc<Mutex<()>>>,
}

impl ForgeService {
    pub fn new(
        store: Arc<dyn Store>,
        authenticator: Arc<dyn Authenticator>,
        interpreter: PrimaryInterpreter,
        greeting: Vec<String>,
    ) -> Self {
        Self {
            store,
            authenticator,
            interpreter,
            greeting,
            locks: DashMap::new(),
        }
    }

    pub fn greeting(&self) -> &[String] {
        &self.greeting
    }

    pub fn interpreter(&self) -> &PrimaryInterpreter {
        &self.interpreter
    }

    /// Registers a new session and returns its connection id together with
    /// the greeting and the first prompt.
    pub async fn on_subscribe(
        &self,
        session: SessionAddress,
        remote_address: Option<String>,
    ) -> Result<(ConnectionId, Output), ForgeError> {
        let connection = Connection::new(Some(session), remote_address);
        self.store.save_connection(&connection).await?;

        info!("New connection from {}", connection.origin());

        let output = Output::from_lines(self.greeting.iter().cloned())
            .and(self.interpreter.prompt(&connection));

        Ok((connection.id, output))
    }

    /// Interprets one line for a connection.
    ///
    /// The connection is loaded, a working copy is interpreted and the copy
    /// is saved only if interpretation succeeded. A missing record is
    /// returned as an error; every other failure is logged and answered
    /// with a generic message, leaving the stored connection untouched.
    pub async fn on_input(
        &self,
        connection_id: ConnectionId,
        line: &str,
    ) -> Result<Output, ForgeError> {
        let lock = self.lock_for(connection_id);
        let guard = lock.lock().await;

        let mut connection = match self.load(connection_id).await {
            Ok(connection) => connection,
            Err(e) if e.is_missing_record() => {
                drop(guard);
                self.locks.remove(&connection_id);
                return Err(e);
            }
            Err(e) => return Ok(self.recover(connection_id, e)),
        };

        trace!("Interpreting input for Connection {}", connection_id);

        let output = match self.interpreter.interpret(line, &mut connection).await {
            Ok(output) => output,
            Err(e) if e.is_missing_record() => return Err(e),
            Err(e) => return Ok(self.recover(connection_id, e)),
        };

        if let Err(e) = self.store.save_connection(&connection).await {
            return Ok(self.recover(connection_id, e));
        }

        Ok(output)
    }

    /// The prompt for a connection's current state.
    pub async fn prompt(&self, connection_id: ConnectionId) -> Result<Output, ForgeError> {
        match self.load(connection_id).await {
            Ok(connection) => Ok(self.interpreter.prompt(&connection)),
            Err(e) if e.is_missing_record() => Err(e),
            Err(e) => Ok(self.recover(connection_id, e)),
        }
    }

    /// Removes every trace of a session: its creature, its connection and
    /// its identity binding.
    ///
    /// Every step runs even if an earlier one fails, so an unreadable record
    /// cannot keep a dead session around. The first failure is returned.
    pub async fn on_disconnect(&self, connection_id: ConnectionId) -> Result<(), ForgeError> {
        let lock = self.lock_for(connection_id);
        let guard = lock.lock().await;

        match self.store.find_connection_by_id(connection_id).await {
            Ok(Some(connection)) => info!("Lost connection from {}", connection.origin()),
            Ok(None) => {}
            Err(e) => error!("Unreadable Connection {} on disconnect: {}", connection_id, e),
        }

        let mut first_error = None;

        if let Err(e) = self.store.delete_creature_by_connection(connection_id).await {
            error!("Unable to delete Creature of Connection {}: {}", connection_id, e);
            first_error.get_or_insert(e);
        }
        if let Err(e) = self.store.delete_connection(connection_id).await {
            error!("Unable to delete Connection {}: {}", connection_id, e);
            first_error.get_or_insert(e);
        }
        if let Err(e) = self.authenticator.end_session(connection_id).await {
            error!("Unable to release session of Connection {}: {}", connection_id, e);
            first_error.get_or_insert(e.into());
        }

        drop(guard);
        self.locks.remove(&connection_id);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of connections that currently hold a line lock.
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    async fn load(&self, connection_id: ConnectionId) -> Result<Connection, ForgeError> {
        self.store
            .find_connection_by_id(connection_id)
            .await?
            .ok_or_else(|| {
                ForgeError::MissingRecord(format!(
                    "Unable to fetch Connection by ID: {}",
                    connection_id
                ))
            })
    }

    fn lock_for(&self, connection_id: ConnectionId) -> Arc<Mutex<()>> {
        self.locks.entry(connection_id).or_default().value().clone()
    }

    fn recover(&self, connection_id: ConnectionId, err: ForgeError) -> Output {
        error!("Unable to handle input for Connection {}: {}", connection_id, err);
        Output::from(SOMETHING_WENT_WRONG)
    }
}
