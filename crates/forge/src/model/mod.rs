//! Records the interpreter reads and writes: connections, creatures and
//! their state.

pub mod connection;
pub mod creature;
pub mod state;

pub use connection::{Connection, ConnectionId, ConnectionRecord, SessionAddress};
pub use creature::{Creature, CreatureId};
pub use state::{ConnectionState, LoginState};
