use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Calendar date of an instant as seen in the business timezone.
pub fn calendar_date(at: DateTime<Utc>, tz: &FixedOffset) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// True when both instants fall on the same calendar day in `tz` (not a rolling 24h window).
pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: &FixedOffset) -> bool {
    calendar_date(a, tz) == calendar_date(b, tz)
}

/// Whole calendar days from `from` to `to`, both truncated to midnight first. Never negative.
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>, tz: &FixedOffset) -> i64 {
    (calendar_date(to, tz) - calendar_date(from, tz)).num_days().max(0)
}
