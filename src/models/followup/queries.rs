use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use super::types::*;
use crate::db::decode_error;
use crate::errors::AppError;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    name: String,
    phone: String,
    issue_type: String,
    village: String,
    status: String,
    response: Option<String>,
    callback_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<Row> for FollowUp {
    type Error = AppError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let status = FollowUpStatus::parse(&row.status)
            .ok_or_else(|| decode_error("follow_ups.status", &row.status))?;
        Ok(FollowUp {
            id: row.id,
            name: row.name,
            phone: row.phone,
            issue_type: row.issue_type,
            village: row.village,
            status,
            response: row.response,
            callback_time: row.callback_time,
            created_at: row.created_at,
        })
    }
}

/// Every follow-up, oldest first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<FollowUp>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, name, phone, issue_type, village, status, response, callback_time, created_at \
         FROM follow_ups ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(FollowUp::try_from).collect()
}

/// Insert or overwrite one follow-up. `created_at` is never rewritten.
pub async fn upsert<'e, E: PgExecutor<'e>>(executor: E, f: &FollowUp) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO follow_ups (id, name, phone, issue_type, village, status, response, callback_time, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (id) DO UPDATE SET \
             name = EXCLUDED.name, \
             phone = EXCLUDED.phone, \
             issue_type = EXCLUDED.issue_type, \
             village = EXCLUDED.village, \
             status = EXCLUDED.status, \
             response = EXCLUDED.response, \
             callback_time = EXCLUDED.callback_time",
    )
    .bind(f.id)
    .bind(&f.name)
    .bind(&f.phone)
    .bind(&f.issue_type)
    .bind(&f.village)
    .bind(f.status.label())
    .bind(&f.response)
    .bind(f.callback_time)
    .bind(f.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
