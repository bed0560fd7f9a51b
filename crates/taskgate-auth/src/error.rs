//! Authentication error types

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use taskgate_db::DbError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username already taken")]
    DuplicateIdentifier,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Token subject does not exist")]
    PrincipalNotFound,

    #[error("Token lifetime out of range")]
    TokenLifetime,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Malformed password hash: {0}")]
    HashFormat(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Credential store error: {0}")]
    Store(#[from] DbError),
}

impl AuthError {
    /// Whether this error is a rejection by the request gate
    pub fn is_gate_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeader
                | AuthError::InvalidToken
                | AuthError::PrincipalNotFound
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_gate_rejection() {
            let body = axum::Json(json!({
                "error": "Could not validate credentials"
            }));
            return (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, "Bearer")],
                body,
            )
                .into_response();
        }

        let (status, message) = match &self {
            AuthError::DuplicateIdentifier => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::InvalidCredentials => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            _ => {
                error!("Internal authentication error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
