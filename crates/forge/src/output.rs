//! The unit of every response sent to a client.
//!
//! An [`Output`] is an ordered list of text lines plus a `secret` flag that
//! asks the client to stop echoing typed characters (password prompts).
//! Lines may carry color markers such as `[red]` or `[default]`; the core
//! treats them as opaque text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker prefix for error lines.
pub const RED: &str = "[red]";
/// Marker prefix for welcome lines.
pub const YELLOW: &str = "[yellow]";
/// Marker prefix for chat lines.
pub const GREEN: &str = "[green]";

/// Shown when a line could not be handled because of a server-side fault.
pub const SOMETHING_WENT_WRONG: &str = "[red]Oops! Something went wrong. The error has been logged.";

/// Ordered, appendable sequence of text lines.
///
/// Two outputs are equal when their lines are equal; the `secret` flag is a
/// presentation hint and does not take part in equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    output: Vec<String>,
    #[serde(default)]
    secret: bool,
}

impl Output {
    /// Creates an empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an output holding the given lines in order.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: lines.into_iter().map(Into::into).collect(),
            secret: false,
        }
    }

    /// Appends a single line.
    pub fn push(&mut self, line: impl Into<String>) -> &mut Self {
        self.output.push(line.into());
        self
    }

    /// Appends every line of `other`. A secret `other` makes this output secret.
    pub fn append(&mut self, other: Output) -> &mut Self {
        self.output.extend(other.output);
        self.secret |= other.secret;
        self
    }

    /// Builder-style variant of [`Output::append`].
    pub fn and(mut self, other: Output) -> Self {
        self.append(other);
        self
    }

    /// Builder-style setter for the secret flag.
    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    pub fn lines(&self) -> &[String] {
        &self.output
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.output
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        self.output == other.output
    }
}

impl Eq for Output {}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output.join("\n"))
    }
}

impl From<&str> for Output {
    fn from(line: &str) -> Self {
        Output::from_lines([line])
    }
}

impl From<String> for Output {
    fn from(line: String) -> Self {
        Output::from_lines([line])
    }
}

impl From<Vec<String>> for Output {
    fn from(lines: Vec<String>) -> Self {
        Output::from_lines(lines)
    }
}
