use std::sync::LazyLock;

use argon2::{
    Algorithm, Argon2, Params, PasswordHasher, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use regex::Regex;

use onboard_types::models::FieldErrors;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

/// Step-1 checks. Uses the same field-keyed shape as component validation.
pub fn validate_credentials(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.insert("email", "Email is invalid");
    }

    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password", "Password must be at least 6 characters");
    }

    errors
}

/// Emails are stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Argon2id password hashing.
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordHashing {
    /// Argon2id with an explicit memory (KiB) and iteration cost.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| anyhow::anyhow!("invalid Argon2 parameters: {}", e))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// PHC string with a fresh random salt.
    pub fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    #[test]
    fn email_rules() {
        assert_eq!(
            validate_credentials("", "secret1").get("email"),
            Some("Email is required")
        );
        assert_eq!(
            validate_credentials("nope", "secret1").get("email"),
            Some("Email is invalid")
        );
        assert_eq!(
            validate_credentials("a@b", "secret1").get("email"),
            Some("Email is invalid")
        );
        assert!(validate_credentials("a@b.com", "secret1").is_empty());
    }

    #[test]
    fn password_rules() {
        assert_eq!(
            validate_credentials("a@b.com", "").get("password"),
            Some("Password is required")
        );
        assert_eq!(
            validate_credentials("a@b.com", "12345").get("password"),
            Some("Password must be at least 6 characters")
        );
        assert!(validate_credentials("a@b.com", "123456").is_empty());
    }

    #[test]
    fn reports_both_fields() {
        assert_eq!(validate_credentials("", "").len(), 2);
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn hashes_verify_with_argon2() {
        let hashing = PasswordHashing::with_cost(8, 1).unwrap();
        let hash = hashing.hash("secret1").unwrap();
        assert_ne!(hash, "secret1");

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"secret1", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"secret2", &parsed).is_err());
    }
}
