//! Factory functions that wire a complete server.
//!
//! These helpers assemble the in-memory store and authenticator, the
//! delivery registry, the interpreters and the session service into a
//! ready-to-run [`ForgeServer`].

use crate::{
    auth::{Argon2PasswordEncoder, MemoryAuthenticator},
    config::ForgeConfig,
    connection::ConnectionManager,
    greeting::{CompositeGreetingLoader, GreetingLoader},
    interpret::PrimaryInterpreter,
    server::ForgeServer,
    session::ForgeService,
    store::MemoryStore,
};
use std::sync::Arc;

/// Creates a new server with default configuration.
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use forge::create_server;
///
/// let server = create_server();
/// # }
/// ```
pub fn create_server() -> ForgeServer {
    create_server_with_config(ForgeConfig::default())
}

/// Creates a new server with custom configuration.
///
/// The greeting is read once, from `config.greeting_path` if it holds
/// anything and from the built-in banner otherwise.
pub fn create_server_with_config(config: ForgeConfig) -> ForgeServer {
    let greeting = CompositeGreetingLoader::new(config.greeting_path.clone()).load();
    let connection_manager = Arc::new(ConnectionManager::new());
    let service = create_service(&config, connection_manager.clone(), greeting);

    ForgeServer::new(config, Arc::new(service), connection_manager)
}

/// Builds a session service on in-memory adapters delivering through
/// `connection_manager`.
pub fn create_service(
    config: &ForgeConfig,
    connection_manager: Arc<ConnectionManager>,
    greeting: Vec<String>,
) -> ForgeService {
    let store = Arc::new(MemoryStore::new());
    let encoder = Arc::new(Argon2PasswordEncoder::new());
    let authenticator = Arc::new(MemoryAuthenticator::new(encoder.clone()));

    let interpreter = PrimaryInterpreter::with_defaults(
        store.clone(),
        connection_manager,
        authenticator.clone(),
        encoder,
        Arc::new(config.prompts.clone()),
    );

    ForgeService::new(store, authenticator, interpreter, greeting)
}
