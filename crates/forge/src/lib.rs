//! # Forge - session interpreter for a text MUD
//!
//! Forge turns lines typed by connected players into state changes and text
//! output. It covers the part of a MUD every session goes through: the login
//! and character creation dialogue, and the first in-world command, gossip,
//! which is broadcast to everyone online.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Primary interpreter** - Dispatches each line on the connection's top-level state
//! * **Login interpreter** - Name and password dialogue, account creation
//! * **In-game interpreter** - Gossip, echoed to every other connected creature
//! * **Session service** - Per-connection transactions around the interpreter
//! * **Connection manager** - Delivery channels for output sent to other sessions
//!
//! ### Message Flow
//!
//! 1. A client sends `{"input": "..."}` (or a bare line) over WebSocket
//! 2. The session service loads the connection and locks it
//! 3. The primary interpreter hands the line to the login or in-game delegate
//! 4. Output for the sender is returned; output for others goes through the
//!    connection manager
//! 5. The updated connection is saved
//!
//! ## Seams
//!
//! Storage ([`store::Store`]), identity ([`auth::Authenticator`]), password
//! hashing ([`auth::PasswordEncoder`]), delivery ([`connection::OutputSink`])
//! and the greeting ([`greeting::GreetingLoader`]) are traits. In-memory
//! implementations ship with the crate.
//!
//! ## Error Handling
//!
//! Bad names, short passwords and wrong credentials are part of the dialogue
//! and come back as `[red]` output lines. [`ForgeError`] is reserved for
//! faults: backend failures, unreadable state, and records that should exist
//! but do not.

// Re-export core types and functions for easy access
pub use config::{ForgeConfig, PromptConfig};
pub use error::ForgeError;
pub use output::Output;
pub use server::ForgeServer;
pub use session::ForgeService;
pub use utils::{create_server, create_server_with_config, create_service};

pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod greeting;
pub mod interpret;
pub mod messaging;
pub mod model;
pub mod output;
pub mod server;
pub mod session;
pub mod store;
pub mod utils;
pub mod validation;
