//! Decoding of client frames and routing them to the interpreter.

pub mod router;
pub mod types;

pub use router::route_client_message;
pub use types::ClientInput;
