use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use super::due::is_due_today;
use super::types::*;
use crate::auth::validate::{validate_optional, validate_required};
use crate::errors::AppError;
use crate::models::calendar::calendar_date;
use crate::models::call_log::{CallLogEntry, CallLogJournal, CallStatus, NewCallLogEntry};

/// The mutable collection of leads, in insertion order.
///
/// Mutations come in pairs: `plan_*` validates and returns the record as it
/// would look afterwards without touching the registry, `commit` installs it.
/// The one-shot methods (`create`, `record_outcome`, ...) do both.
#[derive(Debug, Clone)]
pub struct FollowUpRegistry {
    entries: Vec<FollowUp>,
    index: HashMap<i64, usize>,
    next_id: i64,
}

impl Default for FollowUpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowUpRegistry {
    pub fn new() -> Self {
        FollowUpRegistry { entries: Vec::new(), index: HashMap::new(), next_id: 1 }
    }

    /// Rebuild from stored records; ids give the insertion order.
    pub fn from_records(mut records: Vec<FollowUp>) -> Self {
        records.sort_by_key(|f| f.id);
        let mut registry = FollowUpRegistry::new();
        for record in records {
            registry.commit(record);
        }
        registry
    }

    pub fn get(&self, id: i64) -> Option<&FollowUp> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    fn require(&self, id: i64) -> Result<&FollowUp, AppError> {
        self.get(id).ok_or_else(|| AppError::not_found("follow-up", id))
    }

    pub fn list_all(&self) -> &[FollowUp] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Install a planned record, replacing any record with the same id.
    pub fn commit(&mut self, follow_up: FollowUp) {
        match self.index.get(&follow_up.id) {
            Some(&i) => self.entries[i] = follow_up,
            None => {
                self.next_id = self.next_id.max(follow_up.id + 1);
                self.index.insert(follow_up.id, self.entries.len());
                self.entries.push(follow_up);
            }
        }
    }

    pub fn plan_create(&self, input: &NewFollowUp, now: DateTime<Utc>) -> Result<FollowUp, AppError> {
        validate_required(&input.name, "name", "Name", 100)?;
        validate_required(&input.phone, "phone", "Phone", 20)?;
        validate_optional(&input.issue_type, "issue_type", "Issue type", 100)?;
        validate_optional(&input.village, "village", "Village", 100)?;

        Ok(FollowUp {
            id: self.next_id,
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            issue_type: input.issue_type.trim().to_string(),
            village: input.village.trim().to_string(),
            status: FollowUpStatus::Pending,
            response: None,
            callback_time: None,
            created_at: now,
        })
    }

    pub fn create(&mut self, input: &NewFollowUp, now: DateTime<Utc>) -> Result<FollowUp, AppError> {
        let follow_up = self.plan_create(input, now)?;
        self.commit(follow_up.clone());
        log::info!("follow-up {} created", follow_up.id);
        Ok(follow_up)
    }

    /// Plan the result of a call: the updated lead plus the call log entry it emits.
    pub fn plan_outcome(
        &self,
        id: i64,
        outcome: &CallOutcome,
        journal: &CallLogJournal,
        now: DateTime<Utc>,
    ) -> Result<(FollowUp, CallLogEntry), AppError> {
        let current = self.require(id)?;

        let entry = journal.plan_append(
            NewCallLogEntry {
                follow_up_id: Some(current.id),
                call_time: Some(now),
                customer: current.name.clone(),
                phone: current.phone.clone(),
                duration: outcome.duration.clone(),
                status: outcome.status,
                response: outcome.response.clone(),
                callback_time: outcome.callback_time,
            },
            now,
        )?;

        let mut updated = current.clone();
        updated.status = FollowUpStatus::after_call(outcome.status);
        updated.response = Some(entry.response.clone()).filter(|r| !r.is_empty());
        updated.callback_time = match outcome.status {
            CallStatus::CallBack => entry.callback_time,
            _ => None,
        };

        Ok((updated, entry))
    }

    /// Record a call outcome and append the matching call log entry.
    /// On failure neither the lead nor the journal changes.
    pub fn record_outcome(
        &mut self,
        id: i64,
        outcome: &CallOutcome,
        journal: &mut CallLogJournal,
        now: DateTime<Utc>,
    ) -> Result<(FollowUp, CallLogEntry), AppError> {
        let (updated, entry) = self.plan_outcome(id, outcome, journal, now)?;
        self.commit(updated.clone());
        journal.commit(entry.clone());
        log::info!("follow-up {} outcome {} logged as call {}", id, entry.status, entry.id);
        Ok((updated, entry))
    }

    /// Plan a direct status edit.
    ///
    /// Call Back needs a callback time (the new one, or the one already on the
    /// record); any other status clears the callback so a closed lead does not
    /// resurface through a stale schedule.
    pub fn plan_set_status(
        &self,
        id: i64,
        status: FollowUpStatus,
        callback_time: Option<DateTime<Utc>>,
    ) -> Result<FollowUp, AppError> {
        let current = self.require(id)?;
        let mut updated = current.clone();
        updated.status = status;
        updated.callback_time = match status {
            FollowUpStatus::CallBack => Some(callback_time.or(current.callback_time).ok_or_else(|| {
                AppError::validation("callback_time", "Callback time is required for Call Back")
            })?),
            _ => None,
        };
        Ok(updated)
    }

    pub fn set_status(
        &mut self,
        id: i64,
        status: FollowUpStatus,
        callback_time: Option<DateTime<Utc>>,
    ) -> Result<FollowUp, AppError> {
        let updated = self.plan_set_status(id, status, callback_time)?;
        self.commit(updated.clone());
        log::info!("follow-up {} status set to {}", id, status);
        Ok(updated)
    }

    /// Move the callback to a new time; the lead becomes Call Back.
    pub fn reschedule(&mut self, id: i64, callback_time: DateTime<Utc>) -> Result<FollowUp, AppError> {
        self.set_status(id, FollowUpStatus::CallBack, Some(callback_time))
    }

    /// Today's work in registry insertion order (not sorted by urgency).
    pub fn list_due_today(&self, now: DateTime<Utc>, tz: &FixedOffset) -> Vec<&FollowUp> {
        self.entries
            .iter()
            .filter(|f| is_due_today(f, now, tz))
            .collect()
    }

    /// Case-insensitive match on name, or substring match on phone.
    pub fn search(&self, term: &str) -> Vec<&FollowUp> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle) || f.phone.contains(&needle))
            .collect()
    }

    pub fn list_by_date(&self, date: NaiveDate, tz: &FixedOffset) -> Vec<&FollowUp> {
        self.entries
            .iter()
            .filter(|f| calendar_date(f.created_at, tz) == date)
            .collect()
    }

    pub fn count_by_status(&self, status: FollowUpStatus) -> usize {
        self.entries.iter().filter(|f| f.status == status).count()
    }
}
