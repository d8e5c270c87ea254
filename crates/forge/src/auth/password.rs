//! Password hashing.

use super::AuthError;
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Turns raw passwords into stored hashes and checks them again later.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &str) -> Result<String, AuthError>;

    /// False for a wrong password and for a hash that cannot be parsed.
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

/// Argon2id encoder producing PHC strings (`$argon2id$v=19$m=...`).
///
/// Cost parameters are read back from the stored string on verification,
/// so hashes made with other parameters still match.
#[derive(Clone, Default)]
pub struct Argon2PasswordEncoder {
    argon2: Argon2<'static>,
}

impl Argon2PasswordEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder with explicit memory (KiB), iteration and lane costs.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::Backend(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl std::fmt::Debug for Argon2PasswordEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2PasswordEncoder").finish_non_exhaustive()
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AuthError::Backend(format!("hash_password failed: {e}")))?;

        Ok(hash.to_string())
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        match PasswordHash::new(encoded) {
            Ok(hash) => self.argon2.verify_password(raw.as_bytes(), &hash).is_ok(),
            Err(_) => false,
        }
    }
}
