//! Session token module
//!
//! Stateless session credentials: a signed JWT (HS256) carried in an
//! HTTP-only cookie. The token holds the user id and admin flag; everything
//! else is looked up per-request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "access_token";

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Admin flag at issue time (re-checked against the database on use)
    pub admin: bool,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Errors from token verification
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Issues and verifies session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the configured secret and lifetime
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Token lifetime in seconds (used for the cookie Max-Age)
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for the given user
    pub fn issue(&self, user_id: i64, is_admin: bool) -> Result<String, TokenError> {
        let exp = Utc::now() + self.ttl;
        let claims = Claims {
            sub: user_id,
            admin: is_admin,
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        Ok(data.claims)
    }

    /// Build the Set-Cookie value delivering a token
    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            TOKEN_COOKIE,
            token,
            self.ttl_seconds()
        )
    }

    /// Build the Set-Cookie value clearing the token
    pub fn clear_cookie(&self) -> String {
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", TOKEN_COOKIE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 7)
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let svc = service();

        let token = svc.issue(42, true).expect("Failed to issue token");
        let claims = svc.verify(&token).expect("Failed to verify token");

        assert_eq!(claims.sub, 42);
        assert!(claims.admin);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = service().issue(1, false).unwrap();
        let other = TokenService::new("different-secret", 7);

        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let svc = service();
        let mut token = svc.issue(1, false).unwrap();
        // Flip a character in the payload section
        let mid = token.len() / 2;
        let replacement = if token.as_bytes()[mid] == b'A' { 'B' } else { 'A' };
        token.replace_range(mid..mid + 1, &replacement.to_string());

        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // Negative TTL puts the expiry in the past
        let svc = TokenService::new("test-secret", -1);
        let token = svc.issue(1, false).unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(service().verify("not-a-token").is_err());
        assert!(service().verify("").is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let svc = service();
        let cookie = svc.cookie("abc123");

        assert!(cookie.starts_with("access_token=abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains(&format!("Max-Age={}", 7 * 24 * 60 * 60)));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = service().clear_cookie();
        assert!(cookie.starts_with("access_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
