use chrono::FixedOffset;

use crate::errors::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_OFFSET: &str = "+05:30";

/// Runtime configuration, read from the environment (and `.env` via dotenvy in `main`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Absent means the service runs without durable storage.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Timezone whose calendar decides "today" and days-in-queue.
    pub business_offset: FixedOffset,
    pub audit_retention_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(get: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let database_url = get("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("DB_MAX_CONNECTIONS must be a positive integer, got '{v}'")))?,
            None => 8,
        };

        let offset_raw = get("BUSINESS_UTC_OFFSET").unwrap_or_else(|| DEFAULT_OFFSET.to_string());
        let business_offset = parse_utc_offset(&offset_raw)?;

        let audit_retention_days = match get("AUDIT_RETENTION_DAYS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("AUDIT_RETENTION_DAYS must be a positive integer, got '{v}'")))?,
            None => 90,
        };

        Ok(AppConfig {
            bind_addr,
            database_url,
            db_max_connections,
            business_offset,
            audit_retention_days,
        })
    }
}

/// Parse "+HH:MM", "-HH:MM" or "Z" into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, AppError> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| AppError::Config("invalid zero offset".into()));
    }

    let bad = || AppError::Config(format!("BUSINESS_UTC_OFFSET must look like +05:30, got '{raw}'"));

    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(bad()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(bad)?;
    let hours: i32 = hours.parse().map_err(|_| bad())?;
    let minutes: i32 = minutes.parse().map_err(|_| bad())?;
    if hours > 14 || minutes > 59 {
        return Err(bad());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}
