//! SCIM resource engine services.

pub mod filter;
pub mod group_service;
pub mod mapper;
pub mod patch;
pub mod user_service;

pub use group_service::GroupService;
pub use user_service::UserService;
