use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// The shared admin password, kept only as an `Argon2id` hash.
#[derive(Debug, Clone, Default)]
pub struct AdminCredentials {
    password_hash: Option<String>,
}

impl AdminCredentials {
    /// Hash the configured password. `None` yields credentials that reject every login.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn from_password(password: Option<&str>) -> anyhow::Result<Self> {
        let password_hash = password.map(hash_password).transpose()?;
        Ok(Self { password_hash })
    }

    /// `true` when a password is configured, i.e. logins can succeed at all.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Check a login attempt against the stored hash.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(hash) = &self.password_hash else {
            return false;
        };
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!("Stored admin password hash is invalid: {e}");
                false
            }
        }
    }
}

/// Hash a password using `Argon2id`.
fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;
    Ok(hash.to_string())
}
