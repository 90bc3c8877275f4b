use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use super::types::Expense;
use crate::errors::AppError;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    date: NaiveDate,
    amount: Decimal,
    expense_type: String,
    advance: Decimal,
    description: String,
    user_id: i64,
    created_at: DateTime<Utc>,
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Expense>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, date, amount, expense_type, advance, description, user_id, created_at \
         FROM expenses ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Expense {
            id: row.id,
            date: row.date,
            amount: row.amount,
            expense_type: row.expense_type,
            advance: row.advance,
            description: row.description,
            user_id: row.user_id,
            created_at: row.created_at,
        })
        .collect())
}

pub async fn upsert<'e, E: PgExecutor<'e>>(executor: E, e: &Expense) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO expenses (id, date, amount, expense_type, advance, description, user_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (id) DO UPDATE SET \
             date = EXCLUDED.date, \
             amount = EXCLUDED.amount, \
             expense_type = EXCLUDED.expense_type, \
             advance = EXCLUDED.advance, \
             description = EXCLUDED.description",
    )
    .bind(e.id)
    .bind(e.date)
    .bind(e.amount)
    .bind(&e.expense_type)
    .bind(e.advance)
    .bind(&e.description)
    .bind(e.user_id)
    .bind(e.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
