use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::report::LedgerEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Revenue,
    Expense,
}

/// Which side of the ledger a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Revenue,
    Expense,
}

impl KindFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(KindFilter::All),
            "revenue" => Some(KindFilter::Revenue),
            "expense" => Some(KindFilter::Expense),
            _ => None,
        }
    }

    fn admits(self, kind: EntryKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Revenue => kind == EntryKind::Revenue,
            KindFilter::Expense => kind == EntryKind::Expense,
        }
    }
}

/// Conjunctive filter over ledger rows. Absent members do not constrain.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    /// Inclusive.
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub kind: KindFilter,
}

impl LedgerFilter {
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if !self.kind.admits(entry.kind) {
            return false;
        }
        if self.from.is_some_and(|from| entry.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.date > to) {
            return false;
        }
        if let Some(status) = self.status.as_deref().map(str::trim) {
            if !status.is_empty() && !status.eq_ignore_ascii_case("all") && !entry.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        match self.search.as_deref().map(|s| s.trim().to_lowercase()) {
            Some(needle) if !needle.is_empty() => {
                entry.name.to_lowercase().contains(&needle)
                    || entry.description.to_lowercase().contains(&needle)
                    || entry.id.to_string().contains(&needle)
            }
            _ => true,
        }
    }
}
