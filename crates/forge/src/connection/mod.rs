//! Output delivery to connected sessions.
//!
//! The interpreter never writes to sockets. It hands an [`Output`] and a
//! [`SessionAddress`] to an [`OutputSink`], and the transport behind the
//! sink decides how the lines reach the client.

pub mod manager;

pub use manager::ConnectionManager;

use crate::error::ForgeError;
use crate::model::SessionAddress;
use crate::output::Output;

/// Asynchronous, fire-and-forget delivery of output to a session.
///
/// Implementations must not block waiting for the client. A failure only
/// concerns the one recipient.
pub trait OutputSink: Send + Sync {
    fn deliver(&self, session: &SessionAddress, output: Output) -> Result<(), ForgeError>;
}
