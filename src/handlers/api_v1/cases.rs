use actix_web::{HttpResponse, web};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::{Query, page_params, query_str};
use crate::api_types::PaginatedResponse;
use crate::audit;
use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::case::{
    AssignRequest, Case, CaseFilter, CasePatch, CaseStage, CaseStatus, CompleteRequest, NewCase,
    days_since_assigned,
};

/// A case with its derived lifecycle fields.
#[derive(Serialize)]
pub struct CaseView {
    #[serde(flatten)]
    pub case: Case,
    pub stage: CaseStage,
    pub days_since_assigned: Option<i64>,
}

fn view(case: &Case, now: DateTime<Utc>, tz: &FixedOffset) -> CaseView {
    CaseView {
        case: case.clone(),
        stage: case.stage(),
        days_since_assigned: days_since_assigned(case, now, tz),
    }
}

/// GET /api/v1/cases - All cases
/// Query params: status (Pending / In Progress / Solved), q (name, id, problem), page, per_page
pub async fn list(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("case.view")?;
    let (page, per_page) = page_params(&query);
    let status = query_str(&query, "status")
        .filter(|s| !s.eq_ignore_ascii_case("all"))
        .map(|raw| {
            CaseStatus::parse(raw)
                .ok_or_else(|| AppError::validation("status", format!("Unknown case status '{raw}'")))
        })
        .transpose()?;
    let filter = CaseFilter { status, search: query_str(&query, "q").map(str::to_string) };

    let now = Utc::now();
    let engine = state.engine.lock().await;
    let items: Vec<CaseView> = engine
        .cases
        .list(&filter)
        .into_iter()
        .map(|c| view(c, now, engine.tz()))
        .collect();

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}

/// GET /api/v1/cases/assigned/{officer_id} - An officer's queue
pub async fn assigned(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("case.view")?;
    let officer_id = path.into_inner();
    let (page, per_page) = page_params(&query);

    let now = Utc::now();
    let engine = state.engine.lock().await;
    let items: Vec<CaseView> = engine
        .cases
        .list_assigned_to(officer_id)
        .into_iter()
        .map(|c| view(c, now, engine.tz()))
        .collect();

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}

/// GET /api/v1/cases/{id}
pub async fn read(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    actor.require("case.view")?;
    let id = path.into_inner();

    let engine = state.engine.lock().await;
    let case = engine.cases.get(id).ok_or_else(|| AppError::not_found("case", id))?;

    Ok(HttpResponse::Ok().json(view(case, Utc::now(), engine.tz())))
}

/// POST /api/v1/cases - Case intake
pub async fn create(
    state: web::Data<AppState>,
    actor: ActingUser,
    body: web::Json<NewCase>,
) -> Result<HttpResponse, AppError> {
    actor.require("case.create")?;
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let case = engine.plan_intake(&body, &actor, now)?;
    state.store.save_case(&case).await?;
    engine.cases.commit(case.clone());
    let response = view(&case, now, engine.tz());
    drop(engine);

    let details = serde_json::json!({
        "customer_name": case.customer_name,
        "bank": case.bank,
        "summary": "Case opened via API"
    });
    let _ = audit::log(&state.store, &actor, "case.created", "case", case.id, details).await;

    Ok(HttpResponse::Created().json(response))
}

/// PUT /api/v1/cases/{id} - Edit descriptive fields
pub async fn update(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    body: web::Json<CasePatch>,
) -> Result<HttpResponse, AppError> {
    actor.require("case.edit")?;
    let id = path.into_inner();
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let case = engine.cases.plan_edit(id, &body)?;
    state.store.save_case(&case).await?;
    engine.cases.commit(case.clone());
    let response = view(&case, now, engine.tz());
    drop(engine);

    let _ = audit::log(&state.store, &actor, "case.edited", "case", id, serde_json::json!({})).await;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/cases/{id}/assign - Hand the case to an officer
pub async fn assign(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    body: web::Json<AssignRequest>,
) -> Result<HttpResponse, AppError> {
    actor.require("case.assign")?;
    let id = path.into_inner();
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let case = engine.plan_assign(id, body.officer_id, body.amount, body.start_work, now)?;
    state.store.save_case(&case).await?;
    engine.cases.commit(case.clone());
    let response = view(&case, now, engine.tz());
    drop(engine);

    let details = serde_json::json!({
        "officer_id": body.officer_id,
        "amount": case.amount,
        "status": case.status
    });
    let _ = audit::log(&state.store, &actor, "case.assigned", "case", id, details).await;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/cases/{id}/start - Pending -> In Progress
pub async fn start(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    actor.require("case.work")?;
    let id = path.into_inner();
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let case = engine.cases.plan_start_work(id, &actor)?;
    state.store.save_case(&case).await?;
    engine.cases.commit(case.clone());
    let response = view(&case, now, engine.tz());
    drop(engine);

    let _ = audit::log(&state.store, &actor, "case.started", "case", id, serde_json::json!({})).await;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/cases/{id}/complete - Resolve with CIBIL scores
pub async fn complete(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    body: web::Json<CompleteRequest>,
) -> Result<HttpResponse, AppError> {
    actor.require("case.work")?;
    let id = path.into_inner();
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let case = engine
        .cases
        .plan_complete(id, body.cibil_before, body.cibil_after, &actor, now)?;
    state.store.save_case(&case).await?;
    engine.cases.commit(case.clone());
    let response = view(&case, now, engine.tz());
    drop(engine);

    let details = serde_json::json!({
        "cibil_before": case.cibil_before,
        "cibil_after": case.cibil_after
    });
    let _ = audit::log(&state.store, &actor, "case.solved", "case", id, details).await;

    Ok(HttpResponse::Ok().json(response))
}
