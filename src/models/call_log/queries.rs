use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use super::types::*;
use crate::db::decode_error;
use crate::errors::AppError;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    follow_up_id: Option<i64>,
    call_time: DateTime<Utc>,
    customer: String,
    phone: String,
    duration: Option<String>,
    status: String,
    response: String,
    callback_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<CallLogEntry>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, follow_up_id, call_time, customer, phone, duration, status, response, \
                callback_time, created_at \
         FROM call_logs ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let status = CallStatus::parse(&row.status)
                .ok_or_else(|| decode_error("call_logs.status", &row.status))?;
            Ok(CallLogEntry {
                id: row.id,
                follow_up_id: row.follow_up_id,
                call_time: row.call_time,
                customer: row.customer,
                phone: row.phone,
                duration: row.duration,
                status,
                response: row.response,
                callback_time: row.callback_time,
                created_at: row.created_at,
            })
        })
        .collect()
}

/// Call logs are append-only: a second insert of the same id is an error.
pub async fn insert<'e, E: PgExecutor<'e>>(executor: E, entry: &CallLogEntry) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO call_logs (id, follow_up_id, call_time, customer, phone, duration, status, \
                                response, callback_time, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(entry.id)
    .bind(entry.follow_up_id)
    .bind(entry.call_time)
    .bind(&entry.customer)
    .bind(&entry.phone)
    .bind(&entry.duration)
    .bind(entry.status.label())
    .bind(&entry.response)
    .bind(entry.callback_time)
    .bind(entry.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
