//! Connection handling logic for WebSocket clients.
//!
//! This module manages the lifecycle of one client session: handshake,
//! subscription, the input/output pumps, and cleanup.

use crate::{
    connection::ConnectionManager, error::ForgeError, messaging::route_client_message,
    model::SessionAddress, output::Output, session::ForgeService,
};
use futures::{SinkExt, StreamExt};
use futures_util::stream::SplitSink;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::{debug, error};
use uuid::Uuid;

/// Sent when the server cannot answer a line at all.
pub const TRANSPORT_FAILURE: &str = "[red]Something went wrong! The error has been logged.";

type WsSender = Arc<Mutex<SplitSink<WebSocketStream<TcpStream>, Message>>>;

/// Serializes an output frame and writes it to the socket.
async fn send_output(ws_sender: &WsSender, output: &Output) -> Result<(), ForgeError> {
    let json = serde_json::to_string(output)
        .map_err(|e| ForgeError::Internal(format!("Unable to encode output: {e}")))?;

    let mut ws_sender = ws_sender.lock().await;
    ws_sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ForgeError::Network(format!("Failed to send output: {e}")))
}

/// Handles a single client session from handshake to cleanup.
///
/// # Connection Flow
///
/// 1. Perform the WebSocket handshake
/// 2. Register a delivery channel under a fresh session address
/// 3. Subscribe the session, sending the greeting and first prompt
/// 4. Pump input and output until either side stops
/// 5. Unregister the channel and disconnect the session
///
/// # Arguments
///
/// * `stream` - The TCP stream for the client connection
/// * `addr` - The remote address of the client
/// * `connection_manager` - Registry used for echoes and broadcasts
/// * `service` - Session service that interprets input
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection_manager: Arc<ConnectionManager>,
    service: Arc<ForgeService>,
) -> Result<(), ForgeError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ForgeError::Network(format!("WebSocket handshake failed: {e}")))?;

    let (ws_sender, mut ws_receiver) = ws_stream.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(ws_sender));

    let session = SessionAddress::new(Uuid::new_v4().to_string(), Uuid::new_v4().to_string());
    let mut delivery_receiver = connection_manager.register(&session);

    let (connection_id, greeting) = match service
        .on_subscribe(session.clone(), Some(addr.to_string()))
        .await
    {
        Ok(subscribed) => subscribed,
        Err(e) => {
            connection_manager.unregister(&session);
            let _ = send_output(&ws_sender, &Output::from(TRANSPORT_FAILURE)).await;
            return Err(e);
        }
    };

    debug!("🔗 Connection {} from {} subscribed", connection_id, addr);

    if let Err(e) = send_output(&ws_sender, &greeting).await {
        error!("Failed to greet connection {}: {}", connection_id, e);
    }

    // Incoming task: every text frame is one line of input.
    let incoming_task = {
        let service = service.clone();
        let ws_sender = ws_sender.clone();

        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let output =
                            match route_client_message(&text, connection_id, &service)
                                .await
                            {
                                Ok(output) => output,
                                Err(e) => {
                                    error!("Input error for connection {}: {}", connection_id, e);
                                    Output::from(TRANSPORT_FAILURE)
                                }
                            };

                        if let Err(e) = send_output(&ws_sender, &output).await {
                            error!("{}", e);
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Client {} requested close", connection_id);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        let mut ws_sender = ws_sender.lock().await;
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Err(e) => {
                        error!("WebSocket error for connection {}: {}", connection_id, e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    };

    // Outgoing task: echoes and broadcasts from other sessions.
    let outgoing_task = {
        let ws_sender = ws_sender.clone();

        async move {
            while let Some(output) = delivery_receiver.recv().await {
                if let Err(e) = send_output(&ws_sender, &output).await {
                    error!("{}", e);
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    connection_manager.unregister(&session);
    service.on_disconnect(connection_id).await
}
