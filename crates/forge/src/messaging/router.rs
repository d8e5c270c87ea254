//! Routing of decoded client frames into the session service.

use crate::{
    error::ForgeError, messaging::ClientInput, model::ConnectionId, output::Output,
    session::ForgeService,
};
use tracing::trace;

/// Routes a raw client frame to the session service.
///
/// # Arguments
///
/// * `text` - The raw frame text, either `{"input": "..."}` or a bare line
/// * `connection_id` - The connection the frame arrived on
/// * `service` - The session service that owns the connection
///
/// # Returns
///
/// The output to send back to the originating client, or a `ForgeError`
/// when the connection record is gone.
pub async fn route_client_message(
    text: &str,
    connection_id: ConnectionId,
    service: &ForgeService,
) -> Result<Output, ForgeError> {
    let ClientInput { input } = ClientInput::decode(text);
    trace!("📨 Input from Connection {} ({} chars)", connection_id, input.len());

    service.on_input(connection_id, &input).await
}
