pub mod due;
pub mod queries;
pub mod registry;
pub mod types;

pub use due::is_due_today;
pub use registry::FollowUpRegistry;
pub use types::*;
