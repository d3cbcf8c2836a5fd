//! SCIM request middleware.

pub mod auth;

pub use auth::{bearer_guard, BearerGuard};
