//! Name and password rules for new and returning players.
//!
//! Validators are pure: they either hand the candidate back unchanged or
//! return an [`InvalidInput`] whose message is shown to the player as is.

/// A rejected name or password, carrying the message shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("Names may not contain whitespace.")]
    NameWhitespace,

    #[error("Names may only contain letters.")]
    NameNotLetters,

    #[error("Names must be at least 3 letters long.")]
    NameTooShort,

    #[error("Names may not be longer than 30 letters.")]
    NameTooLong,

    #[error("Names must begin with an upper case letter.")]
    NameLowercaseFirst,

    #[error("Names must not contain upper case letters other than the first.")]
    NameInnerUppercase,

    #[error("Passwords must be at least 8 characters.")]
    PasswordTooShort,
}

pub const MIN_NAME_LENGTH: usize = 3;
pub const MAX_NAME_LENGTH: usize = 30;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks a character name. The first failing rule wins.
pub fn validate_name(candidate: &str) -> Result<&str, InvalidInput> {
    if candidate.chars().any(char::is_whitespace) {
        return Err(InvalidInput::NameWhitespace);
    }

    if !candidate.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(InvalidInput::NameNotLetters);
    }

    // Only ASCII letters remain, so bytes and characters line up.
    if candidate.len() < MIN_NAME_LENGTH {
        return Err(InvalidInput::NameTooShort);
    }

    if candidate.len() > MAX_NAME_LENGTH {
        return Err(InvalidInput::NameTooLong);
    }

    let mut chars = candidate.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_uppercase()) {
        return Err(InvalidInput::NameLowercaseFirst);
    }

    if chars.any(|c| c.is_ascii_uppercase()) {
        return Err(InvalidInput::NameInnerUppercase);
    }

    Ok(candidate)
}

/// Checks a password. Only the length is constrained.
pub fn validate_password(candidate: &str) -> Result<&str, InvalidInput> {
    if candidate.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(InvalidInput::PasswordTooShort);
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["Dani", "Scion", "Abc", "Abcdefghijklmnopqrstuvwxyzabcd"] {
            assert_eq!(validate_name(name), Ok(name));
        }
    }

    #[test]
    fn test_name_messages() {
        let cases = [
            ("Dani Filth", "Names may not contain whitespace."),
            ("Dani\t", "Names may not contain whitespace."),
            ("D4ni", "Names may only contain letters."),
            ("Dani!", "Names may only contain letters."),
            ("", "Names must be at least 3 letters long."),
            ("Da", "Names must be at least 3 letters long."),
            (
                "Abcdefghijklmnopqrstuvwxyzabcde",
                "Names may not be longer than 30 letters.",
            ),
            ("dani", "Names must begin with an upper case letter."),
            (
                "DaNi",
                "Names must not contain upper case letters other than the first.",
            ),
        ];

        for (candidate, message) in cases {
            let err = validate_name(candidate).unwrap_err();
            assert_eq!(err.to_string(), message, "candidate {candidate:?}");
        }
    }

    #[test]
    fn test_first_failure_wins() {
        // Whitespace is checked before the letters-only rule and length.
        assert_eq!(validate_name("a 1"), Err(InvalidInput::NameWhitespace));
        // Non-letters are checked before length.
        assert_eq!(validate_name("1"), Err(InvalidInput::NameNotLetters));
        // Length is checked before case.
        assert_eq!(validate_name("ab"), Err(InvalidInput::NameTooShort));
    }

    #[test]
    fn test_non_ascii_letters_rejected() {
        assert_eq!(validate_name("Dàni"), Err(InvalidInput::NameNotLetters));
    }

    #[test]
    fn test_passwords() {
        assert_eq!(validate_password("password"), Ok("password"));
        assert_eq!(validate_password("a b c d e"), Ok("a b c d e"));

        let err = validate_password("secret").unwrap_err();
        assert_eq!(err.to_string(), "Passwords must be at least 8 characters.");
    }
}
