//! Line interpreters.
//!
//! The [`PrimaryInterpreter`] looks at a connection's top-level state and
//! hands the line to the matching delegate: [`LoginInterpreter`] while the
//! player is logging in or creating a character, [`InGameInterpreter`]
//! afterwards. Delegates reach back into the primary only through the
//! narrow [`Interpreter`] trait, to render prompts and to echo output to
//! other creatures.

pub mod in_game;
pub mod login;
pub mod primary;

pub use in_game::InGameInterpreter;
pub use login::LoginInterpreter;
pub use primary::PrimaryInterpreter;

use crate::error::ForgeError;
use crate::model::{Connection, Creature};
use crate::output::Output;
use async_trait::async_trait;

/// Services the primary interpreter offers to its delegates.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// The prompt for the connection's current state. Pure and idempotent.
    fn prompt(&self, connection: &Connection) -> Output;

    /// Sends `output` followed by the target's own prompt to the target's
    /// session. Does nothing when the target has no reachable session.
    fn echo(&self, target: &Creature, output: &Output);

    /// Sends `output` followed by each recipient's prompt to every connected
    /// creature not in `excluded`. Returns the number of deliveries attempted.
    async fn echo_to_world(&self, output: &Output, excluded: &[&Creature]) -> usize;
}

/// Handles lines for one top-level connection state.
#[async_trait]
pub trait InterpreterDelegate: Send + Sync {
    /// Interprets one line, mutating `connection` in place. The returned
    /// output always ends with the prompt for the resulting state.
    async fn interpret(
        &self,
        primary: &dyn Interpreter,
        input: &str,
        connection: &mut Connection,
    ) -> Result<Output, ForgeError>;

    fn prompt(&self, connection: &Connection) -> Output;
}
