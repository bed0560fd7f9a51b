//! Application state

use std::sync::Arc;
use taskgate_auth::{AuthGate, AuthService, CredentialStore, TokenIssuer};
use taskgate_db::Database;

use crate::catalog::BookCatalog;

/// Prometheus handle rendered by the `/metrics` route
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthService,
    pub gate: AuthGate,
    pub books: Arc<BookCatalog>,
}

impl AppState {
    /// Wire the auth flows and gate over `db` as the credential store
    pub fn new(
        db: Database,
        tokens: Arc<TokenIssuer>,
        books: Arc<BookCatalog>,
    ) -> Result<Self, taskgate_auth::AuthError> {
        let store: Arc<dyn CredentialStore> = Arc::new(db.clone());
        let auth = AuthService::new(store.clone(), tokens.clone())?;
        let gate = AuthGate::new(tokens, store);

        Ok(Self {
            db,
            auth,
            gate,
            books,
        })
    }
}
