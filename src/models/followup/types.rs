use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::call_log::CallStatus;

/// Where a lead stands. Pending and Call Back are "open" work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FollowUpStatus {
    Pending,
    Completed,
    Rejected,
    #[serde(rename = "Call Back")]
    CallBack,
}

impl FollowUpStatus {
    pub const ALL: [FollowUpStatus; 4] = [
        FollowUpStatus::Pending,
        FollowUpStatus::Completed,
        FollowUpStatus::Rejected,
        FollowUpStatus::CallBack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FollowUpStatus::Pending => "Pending",
            FollowUpStatus::Completed => "Completed",
            FollowUpStatus::Rejected => "Rejected",
            FollowUpStatus::CallBack => "Call Back",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.label().eq_ignore_ascii_case(s.trim()))
    }

    /// Open work stays on the due list until explicitly closed.
    pub fn is_open(self) -> bool {
        matches!(self, FollowUpStatus::Pending | FollowUpStatus::CallBack)
    }

    /// Follow-up status implied by the outcome of a call.
    pub fn after_call(outcome: CallStatus) -> Self {
        match outcome {
            CallStatus::Connected => FollowUpStatus::Completed,
            CallStatus::CallBack => FollowUpStatus::CallBack,
            CallStatus::NotConnected | CallStatus::NotResponded => FollowUpStatus::Pending,
        }
    }
}

impl fmt::Display for FollowUpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A contact task for a prospective customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUp {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub issue_type: String,
    pub village: String,
    pub status: FollowUpStatus,
    pub response: Option<String>,
    /// Present whenever `status` is Call Back.
    pub callback_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FollowUp {
    /// Digits-only phone number for the dialer / messaging deep link.
    pub fn dial_digits(&self) -> String {
        self.phone.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

/// Intake input for a new lead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFollowUp {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub village: String,
}

/// What happened on a call placed against a follow-up.
#[derive(Debug, Clone, Deserialize)]
pub struct CallOutcome {
    pub status: CallStatus,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub callback_time: Option<DateTime<Utc>>,
    /// Free text such as "4 min"; required when the call connected.
    #[serde(default)]
    pub duration: Option<String>,
}

/// Direct status edit without an outcome narrative.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: FollowUpStatus,
    #[serde(default)]
    pub callback_time: Option<DateTime<Utc>>,
}
