//! JWT validation for the route layer.
//!
//! Token issuance (login, sessions) lives outside this service;
//! bearer tokens arrive already minted and are only validated here.
//! `issue_token` exists for operator tooling and tests.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Username
    pub username: String,
    /// Is admin
    pub is_admin: bool,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Authentication service
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: u64,
}

impl AuthService {
    /// Create a new authentication service from the shared secret.
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs,
        }
    }

    /// Validate a bearer token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Mint a token for the given identity.
    pub fn issue_token(&self, user_id: Uuid, username: &str, is_admin: bool) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            is_admin,
            iat: now,
            exp: now + self.expiration_secs as i64,
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_validate_round_trip() {
        let auth = AuthService::new("test-secret", 3600);
        let user_id = Uuid::new_v4();
        let token = auth.issue_token(user_id, "alice", true).unwrap();

        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert!(claims.is_admin);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let auth = AuthService::new("test-secret", 3600);
        let token = auth
            .issue_token(Uuid::new_v4(), "alice", false)
            .unwrap();

        let other = AuthService::new("other-secret", 3600);
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let auth = AuthService::new("test-secret", 3600);
        assert!(auth.validate_token("not-a-token").is_err());
    }
}
