pub mod context;
pub mod validate;

pub use context::{ActingUser, Permissions, Role};
