//! API routes

mod auth;
mod books;
mod health;
pub mod metrics;
mod tasks;
pub mod types;

use axum::{Router, middleware};
use std::sync::Arc;
use taskgate_auth::auth_middleware;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    // Everything merged here sits behind the bearer-token gate
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(tasks::routes())
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            auth_middleware,
        ));

    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(books::routes())
        .merge(protected)
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
