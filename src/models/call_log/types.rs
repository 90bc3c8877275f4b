use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    Connected,
    #[serde(rename = "Not Connected")]
    NotConnected,
    #[serde(rename = "Not Responded")]
    NotResponded,
    #[serde(rename = "Call Back")]
    CallBack,
}

impl CallStatus {
    pub const ALL: [CallStatus; 4] = [
        CallStatus::Connected,
        CallStatus::NotConnected,
        CallStatus::NotResponded,
        CallStatus::CallBack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CallStatus::Connected => "Connected",
            CallStatus::NotConnected => "Not Connected",
            CallStatus::NotResponded => "Not Responded",
            CallStatus::CallBack => "Call Back",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded contact attempt. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallLogEntry {
    pub id: i64,
    /// Follow-up that produced this entry, when recorded through a call outcome.
    pub follow_up_id: Option<i64>,
    pub call_time: DateTime<Utc>,
    pub customer: String,
    pub phone: String,
    /// Only for Connected calls.
    pub duration: Option<String>,
    pub status: CallStatus,
    pub response: String,
    /// Only for Call Back outcomes.
    pub callback_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCallLogEntry {
    pub follow_up_id: Option<i64>,
    /// Defaults to the append instant.
    pub call_time: Option<DateTime<Utc>>,
    pub customer: String,
    pub phone: String,
    pub duration: Option<String>,
    pub status: CallStatus,
    pub response: Option<String>,
    pub callback_time: Option<DateTime<Utc>>,
}
