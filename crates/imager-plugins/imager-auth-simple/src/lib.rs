//! # imager-auth-simple
//!
//! Argon2-based implementation of `Credentials`.
//! Hashes account passwords at registration and verifies them at login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use imager_core::error::{AppError, Result};
use imager_core::traits::Credentials;
use secrecy::{ExposeSecret, SecretString};

/// Argon2id with the crate's default (memory-hard) parameters.
#[derive(Default)]
pub struct Argon2Credentials {
    argon2: Argon2<'static>,
}

impl Argon2Credentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Credentials for Argon2Credentials {
    /// Returns a PHC-format string (e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`).
    fn hash_password(&self, password: &SecretString) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    fn verify_password(&self, password: &SecretString, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("stored password hash is malformed: {e}");
                return false;
            }
        };
        self.argon2
            .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_hash_then_verify() {
        let creds = Argon2Credentials::new();
        let hash = creds.hash_password(&secret("billyspassword")).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(creds.verify_password(&secret("billyspassword"), &hash));
        assert!(!creds.verify_password(&secret("not-billys"), &hash));
    }

    #[test]
    fn test_salts_differ() {
        let creds = Argon2Credentials::new();
        let a = creds.hash_password(&secret("billyspassword")).unwrap();
        let b = creds.hash_password(&secret("billyspassword")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let creds = Argon2Credentials::new();
        assert!(!creds.verify_password(&secret("anything"), "not-a-phc-string"));
    }
}
