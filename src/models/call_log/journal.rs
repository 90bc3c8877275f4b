use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

use super::types::*;
use crate::errors::AppError;
use crate::models::calendar::calendar_date;

/// Append-only journal of contact attempts, kept apart from the follow-up
/// registry so history survives later edits to the lead.
#[derive(Debug, Clone)]
pub struct CallLogJournal {
    entries: Vec<CallLogEntry>,
    next_id: i64,
}

impl Default for CallLogJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl CallLogJournal {
    pub fn new() -> Self {
        CallLogJournal { entries: Vec::new(), next_id: 1 }
    }

    /// Rebuild from stored entries (any order); journal order is by id.
    pub fn from_records(mut entries: Vec<CallLogEntry>) -> Self {
        entries.sort_by_key(|e| e.id);
        let next_id = entries.last().map_or(1, |e| e.id + 1);
        CallLogJournal { entries, next_id }
    }

    /// Validate an entry and build it without touching the journal.
    ///
    /// Connected needs a duration and Call Back needs a callback time; both
    /// fields are dropped for every other status.
    pub fn plan_append(&self, input: NewCallLogEntry, now: DateTime<Utc>) -> Result<CallLogEntry, AppError> {
        let duration = input
            .duration
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let duration = match input.status {
            CallStatus::Connected => Some(
                duration.ok_or_else(|| AppError::validation("duration", "Call duration is required for connected calls"))?,
            ),
            _ => None,
        };
        let callback_time = match input.status {
            CallStatus::CallBack => Some(input.callback_time.ok_or_else(|| {
                AppError::validation("callback_time", "Callback time is required for Call Back")
            })?),
            _ => None,
        };

        Ok(CallLogEntry {
            id: self.next_id,
            follow_up_id: input.follow_up_id,
            call_time: input.call_time.unwrap_or(now),
            customer: input.customer.trim().to_string(),
            phone: input.phone.trim().to_string(),
            duration,
            status: input.status,
            response: input.response.unwrap_or_default().trim().to_string(),
            callback_time,
            created_at: now,
        })
    }

    /// Install a planned entry. Entries are never replaced.
    pub fn commit(&mut self, entry: CallLogEntry) {
        if self.entries.iter().any(|e| e.id == entry.id) {
            log::warn!("call log {} already recorded, ignoring duplicate commit", entry.id);
            return;
        }
        self.next_id = self.next_id.max(entry.id + 1);
        self.entries.push(entry);
    }

    /// Validate and append. Every call produces exactly one new entry; there is no deduplication.
    pub fn append(&mut self, input: NewCallLogEntry, now: DateTime<Utc>) -> Result<CallLogEntry, AppError> {
        let entry = self.plan_append(input, now)?;
        self.commit(entry.clone());
        log::info!("call log {} appended ({})", entry.id, entry.status);
        Ok(entry)
    }

    pub fn list_all(&self) -> &[CallLogEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&CallLogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn list_by_date(&self, date: NaiveDate, tz: &FixedOffset) -> Vec<&CallLogEntry> {
        self.entries
            .iter()
            .filter(|e| calendar_date(e.created_at, tz) == date)
            .collect()
    }

    pub fn count_on(&self, date: NaiveDate, tz: &FixedOffset) -> usize {
        self.list_by_date(date, tz).len()
    }

    /// Case-insensitive substring match on customer, phone, status, response or callback time.
    pub fn search(&self, term: &str) -> Vec<&CallLogEntry> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| {
                e.customer.to_lowercase().contains(&needle)
                    || e.phone.to_lowercase().contains(&needle)
                    || e.status.label().to_lowercase().contains(&needle)
                    || e.response.to_lowercase().contains(&needle)
                    || e.callback_time.is_some_and(|cb| {
                        cb.to_rfc3339_opts(SecondsFormat::Secs, true)
                            .to_lowercase()
                            .contains(&needle)
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn input(status: CallStatus) -> NewCallLogEntry {
        NewCallLogEntry {
            follow_up_id: Some(3),
            call_time: None,
            customer: "Suresh Patil".into(),
            phone: "9822012345".into(),
            duration: Some("6 min".into()),
            status,
            response: Some("Asked about settlement".into()),
            callback_time: Some(at("2024-02-02T11:00:00Z")),
        }
    }

    #[test]
    fn connected_requires_duration() {
        let journal = CallLogJournal::new();
        let mut entry = input(CallStatus::Connected);
        entry.duration = Some("   ".into());
        let err = journal.plan_append(entry, at("2024-02-01T10:00:00Z")).unwrap_err();
        assert_eq!(err.field(), Some("duration"));
    }

    #[test]
    fn call_back_requires_callback_time() {
        let journal = CallLogJournal::new();
        let mut entry = input(CallStatus::CallBack);
        entry.callback_time = None;
        let err = journal.plan_append(entry, at("2024-02-01T10:00:00Z")).unwrap_err();
        assert_eq!(err.field(), Some("callback_time"));
    }

    #[test]
    fn stale_fields_are_cleared_for_other_statuses() {
        let mut journal = CallLogJournal::new();
        let entry = journal
            .append(input(CallStatus::NotConnected), at("2024-02-01T10:00:00Z"))
            .unwrap();
        assert_eq!(entry.duration, None);
        assert_eq!(entry.callback_time, None);

        let connected = journal
            .append(input(CallStatus::Connected), at("2024-02-01T10:05:00Z"))
            .unwrap();
        assert_eq!(connected.duration.as_deref(), Some("6 min"));
        assert_eq!(connected.callback_time, None);
    }

    #[test]
    fn each_append_creates_one_entry() {
        let mut journal = CallLogJournal::new();
        let now = at("2024-02-01T10:00:00Z");
        let a = journal.append(input(CallStatus::NotResponded), now).unwrap();
        let b = journal.append(input(CallStatus::NotResponded), now).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(journal.list_all().len(), 2);
    }

    #[test]
    fn duplicate_commit_is_ignored() {
        let mut journal = CallLogJournal::new();
        let entry = journal.plan_append(input(CallStatus::NotResponded), at("2024-02-01T10:00:00Z")).unwrap();
        journal.commit(entry.clone());
        journal.commit(entry);
        assert_eq!(journal.list_all().len(), 1);
    }

    #[test]
    fn search_matches_status_and_callback_text() {
        let mut journal = CallLogJournal::new();
        let now = at("2024-02-01T10:00:00Z");
        journal.append(input(CallStatus::CallBack), now).unwrap();
        journal.append(input(CallStatus::NotConnected), now).unwrap();

        assert_eq!(journal.search("call back").len(), 1);
        assert_eq!(journal.search("2024-02-02").len(), 1);
        assert_eq!(journal.search("SURESH").len(), 2);
        assert_eq!(journal.search("").len(), 2);
        assert!(journal.search("nobody").is_empty());
    }

    #[test]
    fn list_by_date_uses_business_calendar() {
        let tz = FixedOffset::east_opt(19800).unwrap();
        let mut journal = CallLogJournal::new();
        // 19:00 UTC is 00:30 the next day in IST.
        journal.append(input(CallStatus::NotResponded), at("2024-02-01T19:00:00Z")).unwrap();
        journal.append(input(CallStatus::NotResponded), at("2024-02-01T09:00:00Z")).unwrap();

        let feb2 = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        assert_eq!(journal.count_on(feb2, &tz), 1);
    }
}
