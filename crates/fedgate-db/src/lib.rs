//! Directory layer for fedgate.
//!
//! Holds the directory entities (users, groups, memberships), the
//! [`DirectoryStore`] trait that every component receives an explicit handle
//! to, and two implementations:
//!
//! - [`MemoryDirectory`]: in-process store backed by tokio locks, used by
//!   tests and lightweight embeddings
//! - [`PgDirectory`]: PostgreSQL adapter (sqlx)
//!
//! The store owns unit-of-work boundaries: every trait method is one logical
//! commit. Multi-step protocol operations (SCIM PATCH) are folded into a
//! single `update_*` call by the caller.

pub mod error;
pub mod models;
pub mod store;

pub use error::DirectoryError;
pub use models::{DirectoryGroup, DirectoryUser, GroupMember};
pub use store::memory::MemoryDirectory;
pub use store::postgres::PgDirectory;
pub use store::{
    DirectoryStore, GroupUpdate, MembershipWrite, NewGroup, NewUser, Page, PageOf, UserQuery,
    UserUpdate,
};
