//! Signed session tokens.

use jwt_simple::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Custom claims; the account id travels as the JWT subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub is_staff: bool,
}

/// A verified session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: Uuid,
}

#[derive(Debug, Error)]
pub enum SessionKeyError {
    #[error("JWT_PRIVATE_KEY must be set")]
    Missing,
    #[error("JWT_PRIVATE_KEY must be valid base64")]
    Encoding,
    #[error("JWT_PRIVATE_KEY must be a valid Ed25519 key")]
    InvalidKey,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid or expired token: {0}")]
    Invalid(String),
    #[error("Token subject is not an account id")]
    Subject,
}

#[derive(Clone)]
pub struct SessionConfig {
    key_pair: Arc<Ed25519KeyPair>,
    public_key: Arc<Ed25519PublicKey>,
    pub token_expiry: i64,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl SessionConfig {
    /// Reads the base64 Ed25519 key from `JWT_PRIVATE_KEY`.
    pub fn from_env(
        token_expiry: i64,
        issuer: Option<String>,
        audience: Option<String>,
    ) -> Result<Self, SessionKeyError> {
        use base64::Engine;

        let private_key_b64 =
            std::env::var("JWT_PRIVATE_KEY").map_err(|_| SessionKeyError::Missing)?;

        let key_bytes = base64::engine::general_purpose::STANDARD
            .decode(private_key_b64.trim())
            .map_err(|_| SessionKeyError::Encoding)?;

        let key_pair =
            Ed25519KeyPair::from_bytes(&key_bytes).map_err(|_| SessionKeyError::InvalidKey)?;

        Ok(Self {
            token_expiry,
            issuer,
            audience,
            ..Self::from_key_pair(key_pair)
        })
    }

    pub fn from_key_pair(key_pair: Ed25519KeyPair) -> Self {
        let public_key = key_pair.public_key();
        Self {
            key_pair: Arc::new(key_pair),
            public_key: Arc::new(public_key),
            token_expiry: 3600,
            issuer: None,
            audience: None,
        }
    }

    /// Returns `(private, public)` keys, base64 encoded.
    pub fn generate_key_pair() -> (String, String) {
        use base64::Engine;

        let key_pair = Ed25519KeyPair::generate();
        let private_b64 = base64::engine::general_purpose::STANDARD.encode(key_pair.to_bytes());
        let public_b64 =
            base64::engine::general_purpose::STANDARD.encode(key_pair.public_key().to_bytes());
        (private_b64, public_b64)
    }

    pub fn issue(
        &self,
        account_id: Uuid,
        email: &str,
        is_staff: bool,
    ) -> Result<String, jwt_simple::Error> {
        let custom_claims = SessionClaims {
            email: email.to_string(),
            is_staff,
        };

        let mut claims = Claims::with_custom_claims(
            custom_claims,
            Duration::from_secs(self.token_expiry.max(1) as u64),
        )
        .with_subject(account_id.to_string());

        if let Some(issuer) = &self.issuer {
            claims = claims.with_issuer(issuer);
        }
        if let Some(audience) = &self.audience {
            claims = claims.with_audience(audience);
        }

        self.key_pair.sign(claims)
    }

    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let mut options = VerificationOptions::default();
        if let Some(issuer) = &self.issuer {
            options.allowed_issuers = Some(HashSet::from([issuer.clone()]));
        }
        if let Some(audience) = &self.audience {
            options.allowed_audiences = Some(HashSet::from([audience.clone()]));
        }

        let token_data = self
            .public_key
            .verify_token::<SessionClaims>(token, Some(options))
            .map_err(|e| SessionError::Invalid(e.to_string()))?;

        let account_id = token_data
            .subject
            .as_deref()
            .and_then(|sub| Uuid::parse_str(sub).ok())
            .ok_or(SessionError::Subject)?;

        Ok(Session { account_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SessionConfig {
        SessionConfig::from_key_pair(Ed25519KeyPair::generate())
    }

    #[test]
    fn test_issue_and_verify() {
        let config = test_config();
        let account_id = Uuid::new_v4();

        let token = config.issue(account_id, "a@x.edu", true).unwrap();
        let session = config.verify(&token).unwrap();

        assert_eq!(session.account_id, account_id);
    }

    #[test]
    fn test_invalid_token_fails_verification() {
        assert!(test_config().verify("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_key_fails_verification() {
        let token = test_config()
            .issue(Uuid::new_v4(), "a@x.edu", false)
            .unwrap();
        assert!(test_config().verify(&token).is_err());
    }

    #[test]
    fn test_issuer_mismatch_fails_verification() {
        let key_pair = Ed25519KeyPair::generate();
        let bytes = key_pair.to_bytes();

        let mut issuing = SessionConfig::from_key_pair(key_pair);
        issuing.issuer = Some("other".to_string());
        let token = issuing.issue(Uuid::new_v4(), "a@x.edu", false).unwrap();

        let mut verifying = SessionConfig::from_key_pair(Ed25519KeyPair::from_bytes(&bytes).unwrap());
        verifying.issuer = Some("faculty-eval".to_string());
        assert!(verifying.verify(&token).is_err());
    }

    #[test]
    fn test_generated_key_pair_is_usable() {
        use base64::Engine;

        let (private_b64, public_b64) = SessionConfig::generate_key_pair();
        assert!(!public_b64.is_empty());

        let key_bytes = base64::engine::general_purpose::STANDARD
            .decode(&private_b64)
            .unwrap();
        let config = SessionConfig::from_key_pair(Ed25519KeyPair::from_bytes(&key_bytes).unwrap());

        let token = config.issue(Uuid::new_v4(), "a@x.edu", false).unwrap();
        assert!(config.verify(&token).is_ok());
    }
}
