//! In-world commands. For now every line is gossip.

use super::{Interpreter, InterpreterDelegate};
use crate::config::PromptConfig;
use crate::error::ForgeError;
use crate::model::{Connection, ConnectionState};
use crate::output::{Output, GREEN};
use crate::store::Store;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct InGameInterpreter {
    store: Arc<dyn Store>,
    prompts: Arc<PromptConfig>,
}

impl InGameInterpreter {
    pub fn new(store: Arc<dyn Store>, prompts: Arc<PromptConfig>) -> Self {
        Self { store, prompts }
    }
}

#[async_trait]
impl InterpreterDelegate for InGameInterpreter {
    async fn interpret(
        &self,
        primary: &dyn Interpreter,
        input: &str,
        connection: &mut Connection,
    ) -> Result<Output, ForgeError> {
        let creature = self
            .store
            .find_creature_by_connection(connection.id)
            .await?
            .ok_or_else(|| {
                ForgeError::MissingRecord(format!(
                    "Unable to find Creature for Connection {}",
                    connection.id
                ))
            })?;

        let mut output = Output::from(format!("{GREEN}You gossip '{input}{GREEN}'"));
        output.append(primary.prompt(connection));

        let gossip = Output::from(format!("{GREEN}{} gossips '{input}{GREEN}'", creature.name));
        let delivered = primary.echo_to_world(&gossip, &[&creature]).await;
        debug!("{} gossiped to {} listener(s)", creature.name, delivered);

        Ok(output)
    }

    fn prompt(&self, connection: &Connection) -> Output {
        Output::from_lines([
            String::new(),
            self.prompts
                .render(ConnectionState::InGame, connection.display_name()),
        ])
    }
}
