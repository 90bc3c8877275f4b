pub mod calendar;
pub mod call_log;
pub mod case;
pub mod dashboard;
pub mod expense;
pub mod followup;
pub mod ledger;
pub mod offer;
pub mod user;
