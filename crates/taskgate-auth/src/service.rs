//! Registration and login flows

use serde::Serialize;
use std::sync::Arc;
use taskgate_db::{NewUser, User};
use tracing::{debug, info};

use crate::error::AuthError;
use crate::jwt::TokenIssuer;
use crate::password::{hash_password, verify_password};
use crate::store::CredentialStore;

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate username format and length
fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidInput("Username cannot be empty".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // [A-Za-z0-9_-] only
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AuthError::InvalidInput(
            "Username can only contain ASCII letters, digits, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidInput("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Flows ====================

/// Token handed back by a successful login
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Registration and login over a credential store
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenIssuer>,
    /// Verified against when the username is unknown, so a miss costs the
    /// same as a wrong password
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenIssuer>) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("taskgate-timing-equalizer")?;
        Ok(Self {
            store,
            tokens,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Register a new user
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        debug!("Registering user: {}", username);

        let password_hash = hash_password(password)?;
        let user = self
            .store
            .insert(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        metrics::counter!("taskgate_registrations_total").increment(1);
        info!("Registered user: {}", user.username);
        Ok(user)
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        debug!("Login attempt for user: {}", username);

        let user = if password.len() <= MAX_PASSWORD_LENGTH && validate_username(username).is_ok()
        {
            self.store.find_by_username(username).await?
        } else {
            None
        };

        let password_valid = match &user {
            Some(u) => verify_password(password, &u.password_hash)?,
            None => {
                let _ = verify_password(password, &self.dummy_hash);
                false
            }
        };

        let user = match (user, password_valid) {
            (Some(u), true) => u,
            _ => {
                metrics::counter!("taskgate_logins_total", "outcome" => "failure").increment(1);
                debug!("Login failed for user: {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let access_token = self.tokens.issue_default(&user.username)?;

        metrics::counter!("taskgate_logins_total", "outcome" => "success").increment(1);
        info!("User {} logged in successfully", user.username);

        Ok(IssuedToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.tokens.default_ttl().num_seconds(),
        })
    }
}
