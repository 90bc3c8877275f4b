use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use super::types::*;
use crate::db::decode_error;
use crate::errors::AppError;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    customer_name: String,
    phone: String,
    email: String,
    problem: String,
    bank: String,
    loan_type: String,
    amount: Option<Decimal>,
    status: String,
    assigned_to: Option<i64>,
    assigned_date: Option<DateTime<Utc>>,
    cibil_before: Option<i32>,
    cibil_after: Option<i32>,
    resolved_date: Option<DateTime<Utc>>,
    telecaller_id: Option<i64>,
    created_at: DateTime<Utc>,
}

fn score(raw: Option<i32>, column: &str) -> Result<Option<u16>, AppError> {
    raw.map(|v| u16::try_from(v).map_err(|_| decode_error(column, &v.to_string())))
        .transpose()
}

impl TryFrom<Row> for Case {
    type Error = AppError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let status = CaseStatus::parse(&row.status).ok_or_else(|| decode_error("cases.status", &row.status))?;
        let assignment = match (row.assigned_to, row.assigned_date) {
            (Some(officer_id), Some(assigned_date)) => Some(Assignment { officer_id, assigned_date }),
            (None, None) => None,
            _ => return Err(decode_error("cases.assigned_to", "half-set assignment")),
        };
        Ok(Case {
            id: row.id,
            customer_name: row.customer_name,
            phone: row.phone,
            email: row.email,
            problem: row.problem,
            bank: row.bank,
            loan_type: row.loan_type,
            amount: row.amount,
            status,
            assignment,
            cibil_before: score(row.cibil_before, "cases.cibil_before")?,
            cibil_after: score(row.cibil_after, "cases.cibil_after")?,
            resolved_date: row.resolved_date,
            telecaller_id: row.telecaller_id,
            created_at: row.created_at,
        })
    }
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Case>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, customer_name, phone, email, problem, bank, loan_type, amount, status, \
                assigned_to, assigned_date, cibil_before, cibil_after, resolved_date, \
                telecaller_id, created_at \
         FROM cases ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Case::try_from).collect()
}

pub async fn upsert<'e, E: PgExecutor<'e>>(executor: E, case: &Case) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO cases (id, customer_name, phone, email, problem, bank, loan_type, amount, status, \
                            assigned_to, assigned_date, cibil_before, cibil_after, resolved_date, \
                            telecaller_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         ON CONFLICT (id) DO UPDATE SET \
             customer_name = EXCLUDED.customer_name, \
             phone = EXCLUDED.phone, \
             email = EXCLUDED.email, \
             problem = EXCLUDED.problem, \
             bank = EXCLUDED.bank, \
             loan_type = EXCLUDED.loan_type, \
             amount = EXCLUDED.amount, \
             status = EXCLUDED.status, \
             assigned_to = EXCLUDED.assigned_to, \
             assigned_date = EXCLUDED.assigned_date, \
             cibil_before = EXCLUDED.cibil_before, \
             cibil_after = EXCLUDED.cibil_after, \
             resolved_date = EXCLUDED.resolved_date",
    )
    .bind(case.id)
    .bind(&case.customer_name)
    .bind(&case.phone)
    .bind(&case.email)
    .bind(&case.problem)
    .bind(&case.bank)
    .bind(&case.loan_type)
    .bind(case.amount)
    .bind(case.status.label())
    .bind(case.assignment.map(|a| a.officer_id))
    .bind(case.assignment.map(|a| a.assigned_date))
    .bind(case.cibil_before.map(i32::from))
    .bind(case.cibil_after.map(i32::from))
    .bind(case.resolved_date)
    .bind(case.telecaller_id)
    .bind(case.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
