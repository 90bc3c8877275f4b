use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Solved,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 3] = [CaseStatus::Pending, CaseStatus::InProgress, CaseStatus::Solved];

    pub fn label(self) -> &'static str {
        match self {
            CaseStatus::Pending => "Pending",
            CaseStatus::InProgress => "In Progress",
            CaseStatus::Solved => "Solved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle position, derived from the record and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStage {
    Unassigned,
    Assigned,
    Solved,
}

/// Officer and date are set together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    #[serde(rename = "assigned_to")]
    pub officer_id: i64,
    pub assigned_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    pub id: i64,
    pub customer_name: String,
    pub phone: String,
    pub email: String,
    pub problem: String,
    pub bank: String,
    pub loan_type: String,
    pub amount: Option<Decimal>,
    pub status: CaseStatus,
    #[serde(flatten)]
    pub assignment: Option<Assignment>,
    pub cibil_before: Option<u16>,
    pub cibil_after: Option<u16>,
    pub resolved_date: Option<DateTime<Utc>>,
    /// Telecaller who captured the case.
    pub telecaller_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Case {
    pub fn stage(&self) -> CaseStage {
        match (self.status, self.assignment) {
            (CaseStatus::Solved, _) => CaseStage::Solved,
            (_, Some(_)) => CaseStage::Assigned,
            (_, None) => CaseStage::Unassigned,
        }
    }

    pub fn assigned_to(&self) -> Option<i64> {
        self.assignment.map(|a| a.officer_id)
    }
}

/// Intake form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCase {
    pub customer_name: String,
    pub phone: String,
    pub email: String,
    pub problem: String,
    pub bank: String,
    pub loan_type: String,
}

/// Descriptive edits. Status and resolution only move through the lifecycle operations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CasePatch {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub problem: Option<String>,
    pub bank: Option<String>,
    pub loan_type: Option<String>,
    pub amount: Option<Decimal>,
    pub cibil_before: Option<u16>,
    pub cibil_after: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignRequest {
    pub officer_id: i64,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub start_work: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteRequest {
    pub cibil_before: Option<u16>,
    pub cibil_after: Option<u16>,
}

/// Admin "All cases" filter: status plus free text over name, id and problem.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    pub search: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        if self.status.is_some_and(|s| s != case.status) {
            return false;
        }
        match self.search.as_deref().map(|s| s.trim().to_lowercase()) {
            Some(needle) if !needle.is_empty() => {
                case.customer_name.to_lowercase().contains(&needle)
                    || case.id.to_string().contains(&needle)
                    || case.problem.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}
