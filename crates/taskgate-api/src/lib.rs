//! Taskgate REST API
//!
//! This crate provides the Axum-based HTTP API for Taskgate: registration
//! and login, per-user task management behind bearer authentication, and a
//! public in-memory book catalog.

pub mod catalog;
pub mod error;
pub mod routes;
pub mod state;

pub use catalog::{Book, BookCatalog};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
