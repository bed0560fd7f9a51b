//! Taskgate Authentication
//!
//! This crate provides password hashing, signed bearer tokens and the
//! request gate that resolves a token to a stored user.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
pub mod store;

pub use error::AuthError;
pub use jwt::{AuthSettings, Claims, TokenIssuer};
pub use middleware::{auth_middleware, AuthGate, AuthUser, GateStage};
pub use password::{hash_password, verify_password};
pub use service::{AuthService, IssuedToken};
pub use store::CredentialStore;
