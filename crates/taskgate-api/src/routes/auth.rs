//! Registration, login and identity routes

use axum::{
    Extension, Form, Json, Router,
    extract::{
        State,
        rejection::{FormRejection, JsonRejection},
    },
    routing::{get, post},
};
use taskgate_auth::{AuthUser, IssuedToken};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginForm, MessageResponse, RegisterRequest};

/// POST /register
async fn register(
    State(state): State<AppState>,
    request: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = request?;
    state
        .auth
        .register(&request.username, &request.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "User created".to_string(),
    }))
}

/// POST /token, POST /login
async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<IssuedToken>, ApiError> {
    let Form(form) = form?;
    let issued = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(issued))
}

/// GET /me
async fn me(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}

/// Create public auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(login))
        .route("/login", post(login))
}

/// Create auth routes that require a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}
