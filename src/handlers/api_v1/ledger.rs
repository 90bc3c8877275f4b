use actix_web::{HttpResponse, web};

use super::{Query, query_date, query_str};
use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::ledger::{KindFilter, LedgerFilter};

/// GET /api/v1/ledger - Financial report
/// Query params: from, to (inclusive, YYYY-MM-DD), status, q, kind (all / revenue / expense)
pub async fn report(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("ledger.view")?;

    let kind = match query_str(&query, "kind") {
        Some(raw) => KindFilter::parse(raw)
            .ok_or_else(|| AppError::validation("kind", format!("Unknown ledger kind '{raw}'")))?,
        None => KindFilter::All,
    };
    let filter = LedgerFilter {
        from: query_date(&query, "from")?,
        to: query_date(&query, "to")?,
        status: query_str(&query, "status").map(str::to_string),
        search: query_str(&query, "q").map(str::to_string),
        kind,
    };
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(AppError::validation("from", "Start date must not be after end date"));
        }
    }

    let engine = state.engine.lock().await;
    Ok(HttpResponse::Ok().json(engine.ledger_report(&filter)))
}
