//! Two-level connection state.
//!
//! The primary state decides which interpreter handles a line. Only the
//! login phase has steps of its own, so the secondary state lives inside the
//! `Login` variant and disappears as soon as the connection enters the game.

use crate::error::ForgeError;
use std::fmt;

/// Steps of the login and character creation sub-protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoginState {
    #[default]
    Default,
    LoginAskName,
    LoginAskPassword,
    CreateChooseName,
    CreateConfirmName,
    CreateChoosePassword,
    CreateConfirmPassword,
}

impl LoginState {
    pub const ALL: [LoginState; 7] = [
        LoginState::Default,
        LoginState::LoginAskName,
        LoginState::LoginAskPassword,
        LoginState::CreateChooseName,
        LoginState::CreateConfirmName,
        LoginState::CreateChoosePassword,
        LoginState::CreateConfirmPassword,
    ];

    /// Persisted name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginState::Default => "DEFAULT",
            LoginState::LoginAskName => "LOGIN_ASK_NAME",
            LoginState::LoginAskPassword => "LOGIN_ASK_PASSWORD",
            LoginState::CreateChooseName => "CREATE_CHOOSE_NAME",
            LoginState::CreateConfirmName => "CREATE_CONFIRM_NAME",
            LoginState::CreateChoosePassword => "CREATE_CHOOSE_PASSWORD",
            LoginState::CreateConfirmPassword => "CREATE_CONFIRM_PASSWORD",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == value)
    }

    /// Whether the prompt for this state asks for a password.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            LoginState::LoginAskPassword
                | LoginState::CreateChoosePassword
                | LoginState::CreateConfirmPassword
        )
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level phase of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Login(LoginState),
    InGame,
}

pub const PRIMARY_LOGIN: &str = "LOGIN";
pub const PRIMARY_IN_GAME: &str = "IN_GAME";

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Login(LoginState::Default)
    }
}

impl ConnectionState {
    /// Splits the state into its persisted primary and secondary names.
    pub fn to_parts(&self) -> (&'static str, Option<&'static str>) {
        match self {
            ConnectionState::Login(login) => (PRIMARY_LOGIN, Some(login.as_str())),
            ConnectionState::InGame => (PRIMARY_IN_GAME, None),
        }
    }

    /// Rebuilds a state from persisted names.
    ///
    /// A missing secondary state under `LOGIN` means `DEFAULT`. A secondary
    /// state stored next to `IN_GAME` is ignored.
    pub fn from_parts(primary: &str, secondary: Option<&str>) -> Result<Self, ForgeError> {
        let unknown = || ForgeError::UnknownState {
            primary: primary.to_string(),
            secondary: secondary.map(str::to_string),
        };

        match primary {
            PRIMARY_LOGIN => match secondary {
                None => Ok(ConnectionState::Login(LoginState::Default)),
                Some(value) => LoginState::parse(value)
                    .map(ConnectionState::Login)
                    .ok_or_else(unknown),
            },
            PRIMARY_IN_GAME => Ok(ConnectionState::InGame),
            _ => Err(unknown()),
        }
    }

    pub fn login_state(&self) -> Option<LoginState> {
        match self {
            ConnectionState::Login(login) => Some(*login),
            ConnectionState::InGame => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_round_trip_for_every_state() {
        for login in LoginState::ALL {
            let state = ConnectionState::Login(login);
            let (primary, secondary) = state.to_parts();
            assert_eq!(ConnectionState::from_parts(primary, secondary).unwrap(), state);
        }

        let (primary, secondary) = ConnectionState::InGame.to_parts();
        assert_eq!(secondary, None);
        assert_eq!(
            ConnectionState::from_parts(primary, secondary).unwrap(),
            ConnectionState::InGame
        );
    }

    #[test]
    fn test_missing_secondary_defaults() {
        assert_eq!(
            ConnectionState::from_parts("LOGIN", None).unwrap(),
            ConnectionState::Login(LoginState::Default)
        );
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        let err = ConnectionState::from_parts("LOGIN", Some("INVALID")).unwrap_err();
        assert!(matches!(err, ForgeError::UnknownState { .. }));

        let err = ConnectionState::from_parts("MENU", None).unwrap_err();
        assert!(matches!(err, ForgeError::UnknownState { .. }));
    }
}
