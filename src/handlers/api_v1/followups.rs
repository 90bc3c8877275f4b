use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;

use super::{Query, page_params, query_date, query_instant, query_str};
use crate::api_types::PaginatedResponse;
use crate::audit;
use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::call_log::CallLogEntry;
use crate::models::followup::{CallOutcome, FollowUp, NewFollowUp, StatusChange};

#[derive(Serialize)]
struct OutcomeResponse {
    follow_up: FollowUp,
    call_log: CallLogEntry,
}

/// GET /api/v1/followups - List follow-ups
/// Query params: q (name or phone), date (created on, YYYY-MM-DD), page, per_page
pub async fn list(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("followup.view")?;
    let (page, per_page) = page_params(&query);
    let date = query_date(&query, "date")?;

    let engine = state.engine.lock().await;
    let matching = engine.follow_ups.search(query_str(&query, "q").unwrap_or(""));
    let items: Vec<FollowUp> = match date {
        Some(date) => {
            let on_date = engine.follow_ups.list_by_date(date, engine.tz());
            matching
                .into_iter()
                .filter(|f| on_date.iter().any(|d| d.id == f.id))
                .cloned()
                .collect()
        }
        None => matching.into_iter().cloned().collect(),
    };

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}

/// GET /api/v1/followups/due - Today's work
/// Query params: now (RFC 3339, defaults to the current time), page, per_page
pub async fn due(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("followup.view")?;
    let (page, per_page) = page_params(&query);
    let now = query_instant(&query, "now")?.unwrap_or_else(Utc::now);

    let engine = state.engine.lock().await;
    let items: Vec<FollowUp> = engine.list_due_today(now).into_iter().cloned().collect();

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}

/// GET /api/v1/followups/{id}
pub async fn read(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    actor.require("followup.view")?;
    let id = path.into_inner();

    let engine = state.engine.lock().await;
    let follow_up = engine
        .follow_ups
        .get(id)
        .ok_or_else(|| AppError::not_found("follow-up", id))?;

    Ok(HttpResponse::Ok().json(follow_up))
}

/// POST /api/v1/followups - Capture a lead
pub async fn create(
    state: web::Data<AppState>,
    actor: ActingUser,
    body: web::Json<NewFollowUp>,
) -> Result<HttpResponse, AppError> {
    actor.require("followup.manage")?;
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let follow_up = engine.follow_ups.plan_create(&body, now)?;
    state.store.save_follow_up(&follow_up).await?;
    engine.follow_ups.commit(follow_up.clone());
    drop(engine);

    let details = serde_json::json!({
        "name": follow_up.name,
        "issue_type": follow_up.issue_type,
        "summary": "Follow-up created via API"
    });
    let _ = audit::log(&state.store, &actor, "followup.created", "follow_up", follow_up.id, details).await;

    Ok(HttpResponse::Created().json(follow_up))
}

/// POST /api/v1/followups/{id}/outcome - Record a call and log it
pub async fn record_outcome(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    body: web::Json<CallOutcome>,
) -> Result<HttpResponse, AppError> {
    actor.require("followup.manage")?;
    let id = path.into_inner();
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let (follow_up, call_log) = engine.plan_outcome(id, &body, now)?;
    state.store.save_outcome(&follow_up, &call_log).await?;
    engine.commit_outcome(follow_up.clone(), call_log.clone());
    drop(engine);

    let details = serde_json::json!({
        "call_status": call_log.status,
        "follow_up_status": follow_up.status,
        "call_log_id": call_log.id
    });
    let _ = audit::log(&state.store, &actor, "followup.outcome", "follow_up", id, details).await;

    Ok(HttpResponse::Ok().json(OutcomeResponse { follow_up, call_log }))
}

/// PUT /api/v1/followups/{id}/status - Direct status edit
pub async fn set_status(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    body: web::Json<StatusChange>,
) -> Result<HttpResponse, AppError> {
    actor.require("followup.manage")?;
    let id = path.into_inner();

    let mut engine = state.engine.lock().await;
    let follow_up = engine
        .follow_ups
        .plan_set_status(id, body.status, body.callback_time)?;
    state.store.save_follow_up(&follow_up).await?;
    engine.follow_ups.commit(follow_up.clone());
    drop(engine);

    let details = serde_json::json!({ "status": follow_up.status, "callback_time": follow_up.callback_time });
    let _ = audit::log(&state.store, &actor, "followup.status_changed", "follow_up", id, details).await;

    Ok(HttpResponse::Ok().json(follow_up))
}
