pub mod filter;
pub mod report;

pub use filter::{EntryKind, KindFilter, LedgerFilter};
pub use report::{LedgerEntry, LedgerReport, LedgerTotals};
