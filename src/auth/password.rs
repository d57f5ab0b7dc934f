//! Password hashing with Argon2id.

use argon2::{
    password_hash::{
        PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2, Params,
};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::error::DomainError;

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
        }
    }
}

impl PasswordPolicy {
    pub fn complex(min_length: usize) -> Self {
        Self {
            min_length,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }

    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }

        if self.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(PasswordPolicyError::MissingSpecial);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min_length} characters")]
    TooShort { min_length: usize },
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one digit")]
    MissingDigit,
    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

impl From<PasswordPolicyError> for DomainError {
    fn from(err: PasswordPolicyError) -> Self {
        DomainError::validation("password", err.to_string())
    }
}

pub struct PasswordService;

impl PasswordService {
    /// Hashes with Argon2id using `2^memory_cost_log2` KiB of memory.
    ///
    /// 12 (~4MB) suits development and tests, 16 (~64MB) production.
    pub fn hash_password_with_cost(
        password: &str,
        memory_cost_log2: u32,
    ) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);

        // Argon2 needs at least 8 KiB; cap at 4 GiB.
        let m_cost = 1u32 << memory_cost_log2.clamp(3, 22);

        let params =
            Params::new(m_cost, 3, 1, None).map_err(|_| argon2::password_hash::Error::Algorithm)?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// Parameters are read back from the PHC string, so any cost verifies.
    pub fn verify_password(
        password: &str,
        password_hash: &str,
    ) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(password_hash)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = PasswordService::hash_password_with_cost("secure_password_123", TEST_COST)
            .expect("Hashing should succeed");

        assert!(PasswordService::verify_password("secure_password_123", &hash).unwrap());
        assert!(!PasswordService::verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_unique_salts() {
        let hash1 = PasswordService::hash_password_with_cost("same_password", TEST_COST).unwrap();
        let hash2 = PasswordService::hash_password_with_cost("same_password", TEST_COST).unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_is_argon2id_phc_string() {
        let hash = PasswordService::hash_password_with_cost("test", TEST_COST).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("test$"));
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(PasswordService::verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_password_policy_default() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("password").is_ok());
        assert!(policy.validate("short").is_err());
    }

    #[test]
    fn test_password_policy_complex() {
        let policy = PasswordPolicy::complex(8);

        assert!(policy.validate("password1!").is_err());
        assert!(policy.validate("PASSWORD1!").is_err());
        assert!(policy.validate("Password!").is_err());
        assert!(policy.validate("Password1").is_err());
        assert!(policy.validate("Password1!").is_ok());
    }

    #[test]
    fn test_policy_error_becomes_password_validation() {
        let err: DomainError = PasswordPolicy::complex(10)
            .validate("short")
            .unwrap_err()
            .into();
        assert_eq!(err.field(), Some("password"));
        assert!(err.to_string().contains("10 characters"));
    }
}
