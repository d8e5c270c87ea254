//! Message type definitions for client-server communication.

use serde::{Deserialize, Serialize};

/// A line of input sent from a client to the server.
///
/// # Examples
///
/// ```json
/// { "input": "Dani" }
/// ```
///
/// Clients that do not speak JSON may send the bare line instead; see
/// [`ClientInput::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInput {
    /// The text the player typed, without the line terminator
    pub input: String,
}

impl ClientInput {
    /// Decodes a text frame. Anything that is not a JSON input object is
    /// taken as the input line itself.
    pub fn decode(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self {
            input: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json() {
        assert_eq!(ClientInput::decode(r#"{"input":"Dani"}"#).input, "Dani");
    }

    #[test]
    fn test_decode_raw_text() {
        assert_eq!(ClientInput::decode("Hello world!").input, "Hello world!");
        assert_eq!(ClientInput::decode(r#"{"other":1}"#).input, r#"{"other":1}"#);
    }
}
