//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::AuthError;

/// Token signing settings, fixed at startup
#[derive(Clone)]
pub struct AuthSettings {
    /// Symmetric HS256 signing secret
    pub secret_key: String,
    /// Lifetime of tokens issued by a login
    pub access_token_expire_minutes: i64,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret_key", &"<redacted>")
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .finish()
    }
}

impl AuthSettings {
    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expire_minutes)
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
}

/// Issues and validates signed, time-limited bearer tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenIssuer {
    /// Create a new token issuer
    pub fn new(settings: &AuthSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret_key.as_bytes()),
            validation,
            default_ttl: settings.token_ttl(),
        }
    }

    /// Lifetime applied by [`TokenIssuer::issue_default`]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` that expires `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or(AuthError::TokenLifetime)?;

        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing token for subject: {}", subject);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Issue a token with the configured lifetime
    pub fn issue_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, self.default_ttl)
    }

    /// Validate a token and return its subject
    ///
    /// Bad signatures, unparseable payloads and expired tokens all yield
    /// `AuthError::InvalidToken`. A token is expired once `now >= exp`.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })?;

        let now = Utc::now().timestamp();
        if now >= token_data.claims.exp {
            debug!("Token rejected: expired at {}", token_data.claims.exp);
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&AuthSettings {
            secret_key: secret.to_string(),
            access_token_expire_minutes: 60,
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let tokens = issuer("test-secret-key");

        let token = tokens.issue("alice", Duration::minutes(5)).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "alice");

        let token = tokens.issue_default("bob").unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "bob");
    }

    #[test]
    fn test_claims_use_epoch_seconds() {
        let tokens = issuer("test-secret-key");
        let token = tokens.issue_default("alice").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret-key"),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims.exp - data.claims.iat, 60 * 60);
        assert!((data.claims.iat - Utc::now().timestamp()).abs() <= 5);
    }

    #[test]
    fn test_expired_token() {
        let tokens = issuer("test-secret-key");

        let token = tokens.issue("alice", Duration::seconds(-1)).unwrap();
        assert!(matches!(tokens.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let tokens = issuer("test-secret-key");

        assert!(matches!(
            tokens.issue("alice", Duration::days(100_000_000)),
            Err(AuthError::TokenLifetime)
        ));
        assert!(matches!(
            tokens.issue("alice", Duration::days(-100_000_000)),
            Err(AuthError::TokenLifetime)
        ));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let tokens = issuer("test-secret-key");

        let token = tokens.issue("alice", Duration::zero()).unwrap();
        assert!(matches!(tokens.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_invalid_token() {
        let tokens = issuer("test-secret-key");

        assert!(matches!(tokens.validate("invalid-token"), Err(AuthError::InvalidToken)));
        assert!(matches!(tokens.validate(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_signature() {
        let tokens = issuer("test-secret-key");
        let token = tokens.issue_default("alice").unwrap();

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let first = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", unsigned, first, &signature[1..]);

        assert!(matches!(tokens.validate(&tampered), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_settings_debug_hides_secret() {
        let settings = AuthSettings {
            secret_key: "super-secret-value".to_string(),
            access_token_expire_minutes: 60,
        };
        assert!(!format!("{:?}", settings).contains("super-secret-value"));
    }

    #[test]
    fn test_foreign_secret() {
        let ours = issuer("test-secret-key");
        let theirs = issuer("some-other-secret");

        let token = theirs.issue_default("alice").unwrap();
        assert!(matches!(ours.validate(&token), Err(AuthError::InvalidToken)));
    }
}
