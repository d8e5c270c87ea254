//! Core configuration types and defaults.
//!
//! This module contains the configuration consumed by the Forge core: where
//! the transport listens, how many sessions it accepts, where the greeting
//! lives, and the prompt templates the login interpreter renders.

use crate::model::{ConnectionState, LoginState};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Placeholder replaced with the pending or committed name in prompts.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Configuration structure for the Forge core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// The socket address to bind the WebSocket transport to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent sessions allowed
    pub max_connections: usize,

    /// External greeting file, shown to every new session
    pub greeting_path: PathBuf,

    /// Prompt templates per state
    pub prompts: PromptConfig,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_connections: 1000,
            greeting_path: PathBuf::from("config/greeting.txt"),
            prompts: PromptConfig::default(),
        }
    }
}

/// Prompt templates, one per state.
///
/// `{name}` in a template is replaced with the connection's pending or
/// committed name when the prompt is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub default: String,
    pub login_ask_name: String,
    pub login_ask_password: String,
    pub create_choose_name: String,
    pub create_confirm_name: String,
    pub create_choose_password: String,
    pub create_confirm_password: String,
    /// Last line of the in-game prompt; a blank line is always printed first
    pub in_game: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            default: "[default]Create a new character? [y/N]: ".to_string(),
            login_ask_name: "[default]Name: ".to_string(),
            login_ask_password: "[default]Password: ".to_string(),
            create_choose_name: "[default]Please choose a name: ".to_string(),
            create_confirm_name: "[default]Are you sure '{name}' is the name you want? [y/N]: "
                .to_string(),
            create_choose_password: "[default]Please choose a password: ".to_string(),
            create_confirm_password: "[default]Please confirm your password: ".to_string(),
            in_game: "[default]{name}> ".to_string(),
        }
    }
}

impl PromptConfig {
    /// Raw template for a state.
    pub fn template(&self, state: ConnectionState) -> &str {
        match state {
            ConnectionState::InGame => &self.in_game,
            ConnectionState::Login(login) => match login {
                LoginState::Default => &self.default,
                LoginState::LoginAskName => &self.login_ask_name,
                LoginState::LoginAskPassword => &self.login_ask_password,
                LoginState::CreateChooseName => &self.create_choose_name,
                LoginState::CreateConfirmName => &self.create_confirm_name,
                LoginState::CreateChoosePassword => &self.create_choose_password,
                LoginState::CreateConfirmPassword => &self.create_confirm_password,
            },
        }
    }

    /// Renders the template for `state`, substituting `name`.
    pub fn render(&self, state: ConnectionState, name: &str) -> String {
        self.template(state).replace(NAME_PLACEHOLDER, name)
    }

    /// Templates that are empty; an empty prompt leaves the client with
    /// nothing to answer.
    pub fn empty_templates(&self) -> Vec<&'static str> {
        let entries = [
            ("default", &self.default),
            ("login_ask_name", &self.login_ask_name),
            ("login_ask_password", &self.login_ask_password),
            ("create_choose_name", &self.create_choose_name),
            ("create_confirm_name", &self.create_confirm_name),
            ("create_choose_password", &self.create_choose_password),
            ("create_confirm_password", &self.create_confirm_password),
            ("in_game", &self.in_game),
        ];

        entries
            .into_iter()
            .filter(|(_, template)| template.is_empty())
            .map(|(key, _)| key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_name() {
        let prompts = PromptConfig::default();

        assert_eq!(
            prompts.render(ConnectionState::Login(LoginState::CreateConfirmName), "Dani"),
            "[default]Are you sure 'Dani' is the name you want? [y/N]: "
        );
        assert_eq!(prompts.render(ConnectionState::InGame, "Scion"), "[default]Scion> ");
    }

    #[test]
    fn test_render_without_placeholder_is_verbatim() {
        let prompts = PromptConfig::default();

        assert_eq!(
            prompts.render(ConnectionState::Login(LoginState::LoginAskName), "Dani"),
            "[default]Name: "
        );
    }

    #[test]
    fn test_default_templates_are_complete() {
        assert!(PromptConfig::default().empty_templates().is_empty());

        let prompts = PromptConfig {
            in_game: String::new(),
            ..PromptConfig::default()
        };
        assert_eq!(prompts.empty_templates(), vec!["in_game"]);
    }
}
