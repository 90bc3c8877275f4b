pub mod lifecycle;
pub mod queries;
pub mod types;

pub use lifecycle::{CaseBook, days_since_assigned};
pub use types::*;
