//! Banner shown to every new session.
//!
//! Greeting files are plain text with three kinds of lines:
//!
//! * `#` starts a comment, which is dropped
//! * `*` marks a line that is sent verbatim, minus the `*`
//! * anything else has its spaces replaced with `&nbsp;`
//!
//! Lines that end up empty are dropped.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

const EMBEDDED_GREETING: &str = include_str!("../resources/greeting.txt");

pub trait GreetingLoader: Send + Sync {
    fn load(&self) -> Vec<String>;
}

/// Parses greeting text into output lines.
pub fn parse(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            if line.starts_with('#') {
                String::new()
            } else if let Some(verbatim) = line.strip_prefix('*') {
                verbatim.to_string()
            } else {
                line.replace(' ', "&nbsp;")
            }
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Reads the greeting from a file on disk. A missing or unreadable file
/// yields no lines.
#[derive(Debug, Clone)]
pub struct FileGreetingLoader {
    path: PathBuf,
}

impl FileGreetingLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GreetingLoader for FileGreetingLoader {
    fn load(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                info!("Loaded external greeting: {}", self.path.display());
                parse(&text)
            }
            Err(e) => {
                warn!("Unable to read external greeting {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

/// The greeting compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedGreetingLoader;

impl GreetingLoader for EmbeddedGreetingLoader {
    fn load(&self) -> Vec<String> {
        info!("Loaded embedded greeting");
        parse(EMBEDDED_GREETING)
    }
}

/// Prefers the file greeting and falls back to the embedded one when the
/// file gives nothing.
#[derive(Debug, Clone)]
pub struct CompositeGreetingLoader {
    file: FileGreetingLoader,
    embedded: EmbeddedGreetingLoader,
}

impl CompositeGreetingLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FileGreetingLoader::new(path),
            embedded: EmbeddedGreetingLoader,
        }
    }
}

impl GreetingLoader for CompositeGreetingLoader {
    fn load(&self) -> Vec<String> {
        let greeting = self.file.load();

        if greeting.is_empty() {
            self.embedded.load()
        } else {
            greeting
        }
    }
}
