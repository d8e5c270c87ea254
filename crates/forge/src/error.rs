//! Error types and handling for the Forge core.
//!
//! This module defines the error types that can occur while interpreting
//! input, talking to the store or authenticator, and serving connections.

/// Enumeration of possible Forge errors.
///
/// Validation problems and bad credentials never show up here: those are
/// recovered inside the login interpreter and rendered as output lines.
/// Everything in this enum is either an operational fault or a data
/// consistency fault that the caller has to see.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// Network-related errors such as binding failures or handshake issues
    #[error("Network error: {0}")]
    Network(String),

    /// Internal errors that indicate a bug in the interpreter wiring
    #[error("Internal error: {0}")]
    Internal(String),

    /// The store could not read or write a record
    #[error("Store error: {0}")]
    Store(String),

    /// The authenticator failed for a reason other than bad credentials
    #[error("Authentication backend error: {0}")]
    Auth(String),

    /// A record that must exist could not be found
    #[error("Missing record: {0}")]
    MissingRecord(String),

    /// A persisted state value does not name any known state
    #[error("Unknown connection state: primary={primary}, secondary={secondary:?}")]
    UnknownState {
        primary: String,
        secondary: Option<String>,
    },
}

impl ForgeError {
    /// Whether this error is a data consistency fault that must be
    /// surfaced to the caller instead of being turned into a generic message.
    pub fn is_missing_record(&self) -> bool {
        matches!(self, ForgeError::MissingRecord(_))
    }
}
