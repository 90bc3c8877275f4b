pub mod book;
pub mod queries;
pub mod types;

pub use book::ExpenseBook;
pub use types::*;
