use chrono::{DateTime, FixedOffset, Utc};

use super::types::FollowUp;
use crate::models::calendar::same_calendar_day;

/// Decide whether a follow-up belongs in today's work.
///
/// Due when any of these hold:
/// - the status is Pending or Call Back, whatever the dates say;
/// - it was created on the same calendar day as `now` (in `tz`);
/// - a callback is scheduled at or before `now`.
///
/// Pure: callers pass `now` and must re-evaluate on every query.
pub fn is_due_today(follow_up: &FollowUp, now: DateTime<Utc>, tz: &FixedOffset) -> bool {
    if follow_up.status.is_open() {
        return true;
    }
    if same_calendar_day(follow_up.created_at, now, tz) {
        return true;
    }
    follow_up.callback_time.is_some_and(|cb| cb <= now)
}
