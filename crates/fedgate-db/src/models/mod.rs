//! Directory entity models.

pub mod group;
pub mod user;

pub use group::{DirectoryGroup, GroupMember};
pub use user::DirectoryUser;
