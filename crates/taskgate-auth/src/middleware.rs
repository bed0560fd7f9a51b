//! Authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskgate_db::User;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::TokenIssuer;
use crate::store::CredentialStore;

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Furthest point a request reached in the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GateStage {
    Received,
    TokenExtracted,
    TokenValidated,
    PrincipalResolved,
    Authorized,
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header.split_once(' ').ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Resolves the `Authorization` header of a request to a stored user
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenIssuer>,
    store: Arc<dyn CredentialStore>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenIssuer>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tokens, store }
    }

    /// Run a request's authorization header through the gate
    ///
    /// The token's subject must still exist in the credential store; a valid
    /// token for a missing user is rejected.
    pub async fn authorize(&self, header: Option<&HeaderValue>) -> Result<AuthUser, AuthError> {
        let mut stage = GateStage::Received;

        match self.resolve(header, &mut stage).await {
            Ok(user) => {
                debug!("Authenticated user: {} ({:?})", user.username, stage);
                Ok(user)
            }
            Err(e) => {
                if e.is_gate_rejection() {
                    metrics::counter!("taskgate_auth_rejections_total").increment(1);
                }
                debug!("Request rejected after {:?}: {}", stage, e);
                Err(e)
            }
        }
    }

    async fn resolve(
        &self,
        header: Option<&HeaderValue>,
        stage: &mut GateStage,
    ) -> Result<AuthUser, AuthError> {
        let header = header.ok_or(AuthError::MissingAuthHeader)?;
        let header = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        let token = extract_bearer_token(header)?;
        *stage = GateStage::TokenExtracted;

        let subject = self.tokens.validate(token)?;
        *stage = GateStage::TokenValidated;

        let user = self
            .store
            .find_by_username(&subject)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;
        *stage = GateStage::PrincipalResolved;

        let user = AuthUser::from(user);
        *stage = GateStage::Authorized;
        Ok(user)
    }
}

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a valid bearer token for an
/// existing user. On success the `AuthUser` is added to request extensions.
pub async fn auth_middleware(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // The request body is not Sync, so no borrow of the request may live across the await
    let header = request.headers().get(AUTHORIZATION).cloned();
    let user = gate.authorize(header.as_ref()).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
