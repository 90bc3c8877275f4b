pub mod book;
pub mod queries;
pub mod types;

pub use book::OfferBook;
pub use types::*;
