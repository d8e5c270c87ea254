//! Login and character creation.
//!
//! A returning player walks `DEFAULT -> LOGIN_ASK_NAME -> LOGIN_ASK_PASSWORD`
//! and lands in the game. A new player walks
//! `DEFAULT -> CREATE_CHOOSE_NAME -> CREATE_CONFIRM_NAME ->
//! CREATE_CHOOSE_PASSWORD -> CREATE_CONFIRM_PASSWORD`. The pending name is
//! carried in the connection's scratch slot until the creature is built.
//!
//! Validation and credential problems are answered with a red line and the
//! prompt for the resulting state. Only backend and store failures escape
//! as errors.

use super::{Interpreter, InterpreterDelegate};
use crate::auth::{AuthError, Authenticator, PasswordEncoder};
use crate::config::PromptConfig;
use crate::error::ForgeError;
use crate::model::{Connection, ConnectionState, Creature, LoginState};
use crate::output::{Output, RED, SOMETHING_WENT_WRONG, YELLOW};
use crate::store::Store;
use crate::validation::{validate_name, validate_password};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

const BAD_LOGIN: &str = "[red]Sorry! Please try again!";
const NAME_IN_USE: &str = "[red]That name is already in use. Please try another!";
const REGISTRATION_FAILED: &str = "[red]Oops! Something bad happened. The error has been logged.";
const PASSWORD_MISMATCH: &str = "[red]Passwords do not match. Please try again!";

pub struct LoginInterpreter {
    store: Arc<dyn Store>,
    authenticator: Arc<dyn Authenticator>,
    encoder: Arc<dyn PasswordEncoder>,
    prompts: Arc<PromptConfig>,
}

fn is_yes(input: &str) -> bool {
    input.eq_ignore_ascii_case("y")
}

fn red(message: impl std::fmt::Display) -> String {
    format!("{RED}{message}")
}

impl LoginInterpreter {
    pub fn new(
        store: Arc<dyn Store>,
        authenticator: Arc<dyn Authenticator>,
        encoder: Arc<dyn PasswordEncoder>,
        prompts: Arc<PromptConfig>,
    ) -> Self {
        Self {
            store,
            authenticator,
            encoder,
            prompts,
        }
    }

    async fn ask_password(
        &self,
        input: &str,
        connection: &mut Connection,
        output: &mut Output,
    ) -> Result<(), ForgeError> {
        let name = connection.scratch.clone().unwrap_or_default();

        match self.authenticator.authenticate(&name, input, connection.id).await {
            Ok(()) => {
                self.build_creature(connection).await?;
                output.push(format!("{YELLOW}Welcome back, {name}!"));
                info!("Successful login for {} from {}", name, connection.origin());
            }
            Err(AuthError::Backend(reason)) => return Err(ForgeError::Auth(reason)),
            Err(_) => {
                output.push(BAD_LOGIN);
                warn!("Bad password attempt for {} from {}", name, connection.origin());
                connection.scratch = None;
                connection.state = ConnectionState::Login(LoginState::Default);
            }
        }

        Ok(())
    }

    async fn choose_name(
        &self,
        input: &str,
        connection: &mut Connection,
        output: &mut Output,
    ) -> Result<(), ForgeError> {
        let name = match validate_name(input) {
            Ok(name) => name,
            Err(invalid) => {
                output.push(red(invalid));
                return Ok(());
            }
        };

        if self.authenticator.user_exists(name).await? {
            output.push(NAME_IN_USE);
            connection.scratch = None;
        } else {
            connection.scratch = Some(name.to_string());
            connection.state = ConnectionState::Login(LoginState::CreateConfirmName);
        }

        Ok(())
    }

    async fn choose_password(
        &self,
        input: &str,
        connection: &mut Connection,
        output: &mut Output,
    ) -> Result<(), ForgeError> {
        let password = match validate_password(input) {
            Ok(password) => password,
            Err(invalid) => {
                output.push(red(invalid));
                return Ok(());
            }
        };
        let name = connection.scratch.clone().unwrap_or_default();

        let encoded = self.encoder.encode(password)?;
        match self.authenticator.create_user(&name, &encoded).await {
            Ok(()) => {}
            Err(AuthError::UserExists(_)) => {
                // Someone registered the name between confirmation and now.
                output.push(NAME_IN_USE);
                connection.scratch = None;
                connection.state = ConnectionState::Login(LoginState::CreateChooseName);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        match self.authenticator.authenticate(&name, password, connection.id).await {
            Ok(()) => {
                connection.state = ConnectionState::Login(LoginState::CreateConfirmPassword);
            }
            Err(AuthError::Backend(reason)) => return Err(ForgeError::Auth(reason)),
            Err(err) => {
                error!("Unable to log in newly created player {}: {}", name, err);
                // Drop the account so the same name can be retried.
                self.authenticator.delete_user(&name).await?;
                output.push(REGISTRATION_FAILED);
            }
        }

        Ok(())
    }

    async fn confirm_password(
        &self,
        input: &str,
        connection: &mut Connection,
        output: &mut Output,
    ) -> Result<(), ForgeError> {
        let password = match validate_password(input) {
            Ok(password) => password,
            Err(invalid) => {
                output.push(red(invalid));
                return Ok(());
            }
        };
        let name = connection.scratch.clone().unwrap_or_default();

        match self.authenticator.authenticate(&name, password, connection.id).await {
            Ok(()) => {
                self.build_creature(connection).await?;
                output.push(format!("{YELLOW}Welcome, {name}!"));
                info!("New player {} from {}", name, connection.origin());
            }
            Err(AuthError::Backend(reason)) => return Err(ForgeError::Auth(reason)),
            Err(_) => {
                output.push(PASSWORD_MISMATCH);
                self.authenticator.delete_user(&name).await?;
                self.authenticator.end_session(connection.id).await?;
                connection.state = ConnectionState::Login(LoginState::CreateChoosePassword);
            }
        }

        Ok(())
    }

    /// Commits the pending name, moves the connection into the game and
    /// creates its creature.
    ///
    /// Either both records are written or neither is: on failure the
    /// previous connection record is put back, the session binding is
    /// released and the error is returned.
    async fn build_creature(&self, connection: &mut Connection) -> Result<(), ForgeError> {
        let previous = connection.clone();
        let name = connection.scratch.take().unwrap_or_default();

        connection.name = Some(name.clone());
        connection.state = ConnectionState::InGame;

        if let Err(err) = self.commit_creature(&name, connection).await {
            *connection = previous;

            if let Err(restore) = self.store.save_connection(connection).await {
                error!("Unable to restore Connection {}: {}", connection.id, restore);
            }
            if let Err(release) = self.authenticator.end_session(connection.id).await {
                error!("Unable to release session of Connection {}: {}", connection.id, release);
            }

            return Err(err);
        }

        Ok(())
    }

    async fn commit_creature(&self, name: &str, connection: &Connection) -> Result<(), ForgeError> {
        self.store.save_connection(connection).await?;

        let creature = Creature::new(name, Some(connection.clone()));
        self.store.save_creature(&creature).await
    }
}

#[async_trait]
impl InterpreterDelegate for LoginInterpreter {
    async fn interpret(
        &self,
        primary: &dyn Interpreter,
        input: &str,
        connection: &mut Connection,
    ) -> Result<Output, ForgeError> {
        let ConnectionState::Login(state) = connection.state else {
            return Err(ForgeError::Internal(format!(
                "Connection {} is not logging in",
                connection.id
            )));
        };

        let mut output = Output::new();

        match state {
            LoginState::Default => {
                connection.state = if is_yes(input) {
                    ConnectionState::Login(LoginState::CreateChooseName)
                } else {
                    ConnectionState::Login(LoginState::LoginAskName)
                };
            }
            LoginState::LoginAskName => match validate_name(input) {
                Ok(name) => {
                    connection.scratch = Some(name.to_string());
                    connection.state = ConnectionState::Login(LoginState::LoginAskPassword);
                }
                Err(invalid) => {
                    output.push(red(invalid));
                }
            },
            LoginState::LoginAskPassword => {
                self.ask_password(input, connection, &mut output).await?;
            }
            LoginState::CreateChooseName => {
                self.choose_name(input, connection, &mut output).await?;
            }
            LoginState::CreateConfirmName => {
                if is_yes(input) {
                    connection.state = ConnectionState::Login(LoginState::CreateChoosePassword);
                } else {
                    connection.scratch = None;
                    connection.state = ConnectionState::Login(LoginState::CreateChooseName);
                }
            }
            LoginState::CreateChoosePassword => {
                self.choose_password(input, connection, &mut output).await?;
            }
            LoginState::CreateConfirmPassword => {
                self.confirm_password(input, connection, &mut output).await?;
            }
        }

        output.append(primary.prompt(connection));
        Ok(output)
    }

    fn prompt(&self, connection: &Connection) -> Output {
        match connection.state {
            ConnectionState::Login(state) => {
                Output::from(self.prompts.render(connection.state, connection.display_name()))
                    .with_secret(state.is_secret())
            }
            ConnectionState::InGame => {
                error!("Login prompt requested for in-game Connection {}", connection.id);
                Output::from(SOMETHING_WENT_WRONG)
            }
        }
    }
}
