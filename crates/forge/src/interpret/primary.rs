//! State dispatch plus the echo and broadcast primitives.

use super::{InGameInterpreter, Interpreter, InterpreterDelegate, LoginInterpreter};
use crate::auth::{Authenticator, PasswordEncoder};
use crate::config::PromptConfig;
use crate::connection::OutputSink;
use crate::error::ForgeError;
use crate::model::{Connection, ConnectionState, Creature};
use crate::output::Output;
use crate::store::Store;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, trace, warn};

/// Entry point for every line a connection sends.
///
/// Owns one delegate per top-level state and the sink used to reach other
/// sessions. Delegates only see it as `&dyn Interpreter`.
pub struct PrimaryInterpreter {
    store: Arc<dyn Store>,
    sink: Arc<dyn OutputSink>,
    login: Box<dyn InterpreterDelegate>,
    in_game: Box<dyn InterpreterDelegate>,
}

impl PrimaryInterpreter {
    pub fn new(
        store: Arc<dyn Store>,
        sink: Arc<dyn OutputSink>,
        login: Box<dyn InterpreterDelegate>,
        in_game: Box<dyn InterpreterDelegate>,
    ) -> Self {
        Self {
            store,
            sink,
            login,
            in_game,
        }
    }

    /// Wires the stock login and in-game delegates.
    pub fn with_defaults(
        store: Arc<dyn Store>,
        sink: Arc<dyn OutputSink>,
        authenticator: Arc<dyn Authenticator>,
        encoder: Arc<dyn PasswordEncoder>,
        prompts: Arc<PromptConfig>,
    ) -> Self {
        let login = LoginInterpreter::new(store.clone(), authenticator, encoder, prompts.clone());
        let in_game = InGameInterpreter::new(store.clone(), prompts);

        Self::new(store, sink, Box::new(login), Box::new(in_game))
    }

    /// Interprets one line for `connection`, updating it in place.
    ///
    /// The caller is responsible for persisting `connection` when this
    /// returns `Ok`.
    pub async fn interpret(
        &self,
        input: &str,
        connection: &mut Connection,
    ) -> Result<Output, ForgeError> {
        let delegate = self.delegate(connection.state);
        delegate.interpret(self, input, connection).await
    }

    fn delegate(&self, state: ConnectionState) -> &dyn InterpreterDelegate {
        match state {
            ConnectionState::Login(_) => self.login.as_ref(),
            ConnectionState::InGame => self.in_game.as_ref(),
        }
    }
}

#[async_trait]
impl Interpreter for PrimaryInterpreter {
    fn prompt(&self, connection: &Connection) -> Output {
        self.delegate(connection.state).prompt(connection)
    }

    fn echo(&self, target: &Creature, output: &Output) {
        let Some(connection) = &target.connection else {
            return;
        };
        let Some(session) = &connection.session else {
            return;
        };

        let message = output.clone().and(self.prompt(connection));
        if let Err(e) = self.sink.deliver(session, message) {
            warn!("Unable to echo to {}: {}", target.name, e);
        }
    }

    async fn echo_to_world(&self, output: &Output, excluded: &[&Creature]) -> usize {
        let creatures = match self.store.find_all_connected_creatures().await {
            Ok(creatures) => creatures,
            Err(e) => {
                error!("Unable to list connected creatures: {}", e);
                return 0;
            }
        };

        let mut attempted = 0;

        for target in creatures
            .iter()
            .filter(|target| !excluded.iter().any(|excluded| excluded.id == target.id))
        {
            let Some(connection) = &target.connection else {
                continue;
            };
            let Some(session) = &connection.session else {
                continue;
            };

            attempted += 1;
            let message = output.clone().and(self.prompt(connection));
            if let Err(e) = self.sink.deliver(session, message) {
                warn!("Unable to deliver to {}: {}", target.name, e);
            }
        }

        trace!("Echoed to {} creature(s)", attempted);
        attempted
    }
}
