pub mod directory;
pub mod queries;
pub mod types;

pub use directory::UserDirectory;
pub use types::*;
