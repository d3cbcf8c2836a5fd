//! SCIM 2.0 API for fedgate
//!
//! This crate implements the SCIM 2.0 protocol (RFC 7644) surface for
//! automated user and group provisioning from enterprise identity providers.
//!
//! # Features
//!
//! - User provisioning (create, read, update, delete)
//! - Group provisioning with set-based membership management
//! - Single-predicate filter support (`userName eq "..."`)
//! - PATCH interpretation with ordered in-memory application and a single
//!   store commit per request
//! - Static Bearer token authentication that fails closed when unconfigured
//!
//! # Usage
//!
//! ```rust,ignore
//! use fedgate_api_scim::router::{scim_router, ScimConfig};
//!
//! let app = scim_router(ScimConfig::new(store, Some(token)));
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use error::ScimError;
pub use router::{scim_router, ScimConfig};
