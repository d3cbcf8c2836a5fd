//! Identity gatekeeper for fedgate
//!
//! Binds assertion-authenticated sessions to the provisioning directory.
//! The external assertion layer validates the SAML exchange and hands over a
//! claim set; this crate resolves it to a directory user, enforces the
//! active-user policy, and schedules the asynchronous last-login touch.
//!
//! # Components
//!
//! - [`claims`]: claim set model with ordered identifier-synonym tables
//! - [`resolver`]: candidate-identifier resolution with a uniform
//!   deny-on-ambiguity policy
//! - [`gatekeeper`]: per-request axum middleware (skip list, deny redirect,
//!   `DirectoryIdentity` extension)
//! - [`signin`]: the boolean sign-in gate exposed to the application layer
//! - [`last_login`]: supervised fire-and-forget touch worker
//! - [`profile`] / [`admin`]: read accessors for profile display and
//!   administration

pub mod admin;
pub mod claims;
pub mod gatekeeper;
pub mod last_login;
pub mod profile;
pub mod resolver;
pub mod signin;

pub use claims::ClaimSet;
pub use gatekeeper::{gatekeeper_middleware, AuthSession, DirectoryIdentity, Gatekeeper, GatekeeperConfig};
pub use last_login::{spawn_touch_worker, LoginTouchHandle};
pub use profile::{ProfileService, UserProfile};
pub use resolver::{DenyReason, IdentityResolver, Resolution};
pub use signin::SignInGate;
