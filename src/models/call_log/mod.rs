pub mod journal;
pub mod queries;
pub mod types;

pub use journal::CallLogJournal;
pub use types::*;
