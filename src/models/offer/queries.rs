use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use super::types::*;
use crate::db::decode_error;
use crate::errors::AppError;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    case_id: i64,
    deal_amount: Decimal,
    advance_paid: Decimal,
    case_status: String,
    payment_status: String,
    payment_proof: Option<String>,
    agent_id: i64,
    created_at: DateTime<Utc>,
}

/// Offers are rebuilt through `Offer::new` so the stored pending amount is
/// re-derived rather than trusted.
pub async fn find_all(pool: &PgPool) -> Result<Vec<Offer>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, case_id, deal_amount, advance_paid, case_status, payment_status, \
                payment_proof, agent_id, created_at \
         FROM offers ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let mut offer = Offer::new(
                row.id,
                row.case_id,
                row.deal_amount,
                row.advance_paid,
                row.agent_id,
                row.created_at,
            )?;
            offer.case_status = OfferCaseStatus::parse(&row.case_status)
                .ok_or_else(|| decode_error("offers.case_status", &row.case_status))?;
            offer.payment_status = PaymentStatus::parse(&row.payment_status)
                .ok_or_else(|| decode_error("offers.payment_status", &row.payment_status))?;
            offer.payment_proof = row.payment_proof;
            Ok(offer)
        })
        .collect()
}

pub async fn upsert<'e, E: PgExecutor<'e>>(executor: E, offer: &Offer) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO offers (id, case_id, deal_amount, advance_paid, pending_amount, case_status, \
                             payment_status, payment_proof, agent_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (id) DO UPDATE SET \
             deal_amount = EXCLUDED.deal_amount, \
             advance_paid = EXCLUDED.advance_paid, \
             pending_amount = EXCLUDED.pending_amount, \
             case_status = EXCLUDED.case_status, \
             payment_status = EXCLUDED.payment_status, \
             payment_proof = EXCLUDED.payment_proof",
    )
    .bind(offer.id)
    .bind(offer.case_id)
    .bind(offer.deal_amount())
    .bind(offer.advance_paid())
    .bind(offer.pending_amount())
    .bind(offer.case_status.label())
    .bind(offer.payment_status.label())
    .bind(&offer.payment_proof)
    .bind(offer.agent_id)
    .bind(offer.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM offers WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
