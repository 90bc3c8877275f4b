use actix_web::{HttpResponse, web};

use super::{Query, page_params, query_date, query_str};
use crate::api_types::PaginatedResponse;
use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::call_log::CallLogEntry;

/// GET /api/v1/call-logs - Call journal
/// Query params: date (YYYY-MM-DD), q (customer, phone, status, response, callback), page, per_page
pub async fn list(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("followup.view")?;
    let (page, per_page) = page_params(&query);
    let date = query_date(&query, "date")?;

    let engine = state.engine.lock().await;
    let matching = engine.call_logs.search(query_str(&query, "q").unwrap_or(""));
    let items: Vec<CallLogEntry> = match date {
        Some(date) => {
            let on_date = engine.call_logs.list_by_date(date, engine.tz());
            matching
                .into_iter()
                .filter(|e| on_date.iter().any(|d| d.id == e.id))
                .cloned()
                .collect()
        }
        None => matching.into_iter().cloned().collect(),
    };

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}
