//! Core WebSocket server implementation.
//!
//! This module contains the `ForgeServer` struct: it owns the listener, the
//! delivery registry and the session service, and runs the accept loop until
//! shutdown is requested.

use crate::{
    config::ForgeConfig, connection::ConnectionManager, error::ForgeError,
    server::handlers::handle_connection, session::ForgeService,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// The WebSocket front of a Forge server.
///
/// # Architecture
///
/// * **Session service**: interprets every line a client sends
/// * **Connection manager**: delivery channels for echoes and broadcasts
/// * **Accept loop**: one task per client, bounded by `max_connections`
pub struct ForgeServer {
    /// Server configuration settings
    config: ForgeConfig,

    /// Service that owns connection records and interpreters
    service: Arc<ForgeService>,

    /// Registry of delivery channels, shared with the interpreter's sink
    connection_manager: Arc<ConnectionManager>,

    /// Number of sessions currently being served
    active_connections: Arc<AtomicUsize>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl ForgeServer {
    /// Creates a new server.
    ///
    /// `connection_manager` must be the same registry the service's
    /// interpreter delivers through, otherwise broadcasts never reach
    /// sessions accepted here.
    pub fn new(
        config: ForgeConfig,
        service: Arc<ForgeService>,
        connection_manager: Arc<ConnectionManager>,
    ) -> Self {
        let (shutdown_sender, _) = broadcast::channel(1);

        Self {
            config,
            service,
            connection_manager,
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_sender,
        }
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn start(&self) -> Result<(), ForgeError> {
        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| {
                ForgeError::Network(format!("Failed to bind {}: {e}", self.config.bind_address))
            })?;

        self.serve(listener).await
    }

    /// Serves an already bound listener until shutdown or an accept failure.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ForgeError> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ForgeError::Network(e.to_string()))?;
        info!("🚀 Forge listening on ws://{}", local_addr);

        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        let accept_loop = async {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        if self.active_connections.load(Ordering::Acquire)
                            >= self.config.max_connections
                        {
                            warn!("Rejecting {}: connection limit {} reached", addr, self.config.max_connections);
                            drop(stream);
                            continue;
                        }

                        self.active_connections.fetch_add(1, Ordering::AcqRel);

                        let connection_manager = self.connection_manager.clone();
                        let service = self.service.clone();
                        let active_connections = self.active_connections.clone();

                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_connection(stream, addr, connection_manager, service).await
                            {
                                error!("Connection error: {}", e);
                            }
                            active_connections.fetch_sub(1, Ordering::AcqRel);
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        break;
                    }
                }
            }
        };

        tokio::select! {
            _ = accept_loop => {}
            _ = shutdown_receiver.recv() => {
                info!("Internal shutdown signal received");
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Initiates server shutdown.
    pub async fn shutdown(&self) -> Result<(), ForgeError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }

    pub fn connection_manager(&self) -> Arc<ConnectionManager> {
        self.connection_manager.clone()
    }

    pub fn service(&self) -> Arc<ForgeService> {
        self.service.clone()
    }
}
