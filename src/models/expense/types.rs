use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An operational outlay, independent of any case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub expense_type: String,
    pub advance: Decimal,
    pub description: String,
    /// Owner.
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Expense form. Date, amount and type are mandatory; advance defaults to zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewExpense {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub expense_type: String,
    pub advance: Option<Decimal>,
    pub description: String,
}
