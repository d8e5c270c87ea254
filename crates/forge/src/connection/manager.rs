//! Registry of live delivery channels.
//!
//! Each transport session registers an unbounded channel under its session
//! username. Broadcasts and echoes from other connections are pushed into
//! that channel and drained by the session's outgoing task.

use super::OutputSink;
use crate::error::ForgeError;
use crate::model::SessionAddress;
use crate::output::Output;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Central registry of delivery channels for all sessions.
///
/// # Architecture
///
/// * Uses `DashMap` so registration and delivery never contend on one lock
/// * One unbounded `mpsc` channel per session, so sending never waits
/// * A closed receiver is reported as a failure for that session only
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// Map of session username to its outgoing channel
    senders: DashMap<String, mpsc::UnboundedSender<Output>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session and returns the receiving half of its channel.
    ///
    /// Registering the same username twice replaces the previous channel;
    /// the old receiver sees its stream end.
    ///
    /// # Arguments
    ///
    /// * `session` - The address other connections will deliver to
    pub fn register(&self, session: &SessionAddress) -> mpsc::UnboundedReceiver<Output> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.senders.insert(session.username.clone(), sender);
        debug!("📬 Registered delivery channel for {}", session.username);
        receiver
    }

    /// Removes a session. Later deliveries to it fail.
    pub fn unregister(&self, session: &SessionAddress) {
        if self.senders.remove(&session.username).is_some() {
            debug!("📭 Removed delivery channel for {}", session.username);
        }
    }

    /// Number of sessions that can currently receive output.
    pub fn session_count(&self) -> usize {
        self.senders.len()
    }

    pub fn is_registered(&self, session: &SessionAddress) -> bool {
        self.senders.contains_key(&session.username)
    }
}

impl OutputSink for ConnectionManager {
    fn deliver(&self, session: &SessionAddress, output: Output) -> Result<(), ForgeError> {
        let sender = self
            .senders
            .get(&session.username)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                ForgeError::Network(format!("No delivery channel for {}", session.username))
            })?;

        sender.send(output).map_err(|_| {
            ForgeError::Network(format!("Delivery channel for {} is closed", session.username))
        })?;

        trace!("📤 Queued output for {}", session.username);
        Ok(())
    }
}
