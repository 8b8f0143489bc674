//! Database models split into domain-specific modules.

pub mod permission;
pub mod task;
pub mod user;

pub use permission::*;
pub use task::*;
pub use user::*;
