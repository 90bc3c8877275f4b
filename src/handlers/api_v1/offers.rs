use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;

use super::{Query, page_params, query_id};
use crate::api_types::PaginatedResponse;
use crate::audit;
use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::offer::{AgentOfferStats, NewOffer, Offer, OfferPatch};

#[derive(Serialize)]
struct AgentOffersResponse {
    stats: AgentOfferStats,
    #[serde(flatten)]
    offers: PaginatedResponse<Offer>,
}

/// GET /api/v1/offers - List offers
/// Query params: case_id (optional), page, per_page
pub async fn list(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("offer.view")?;
    let (page, per_page) = page_params(&query);
    let case_id = query_id(&query, "case_id")?;

    let engine = state.engine.lock().await;
    let items: Vec<Offer> = match case_id {
        Some(case_id) => engine.offers.list_by_case(case_id).into_iter().cloned().collect(),
        None => engine.offers.list_all().to_vec(),
    };

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}

/// GET /api/v1/offers/agent/{agent_id} - An agent's offers and performance
pub async fn by_agent(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("offer.view")?;
    let agent_id = path.into_inner();
    let (page, per_page) = page_params(&query);

    let engine = state.engine.lock().await;
    let items: Vec<Offer> = engine.offers.list_by_agent(agent_id).into_iter().cloned().collect();
    let response = AgentOffersResponse {
        stats: engine.offers.agent_stats(agent_id),
        offers: PaginatedResponse::from_items(items, page, per_page),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/offers - Attach terms to a case assigned to the caller, who becomes the agent.
pub async fn create(
    state: web::Data<AppState>,
    actor: ActingUser,
    body: web::Json<NewOffer>,
) -> Result<HttpResponse, AppError> {
    actor.require("offer.manage")?;
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let offer = engine.plan_create_offer(&body, &actor, now)?;
    state.store.save_offer(&offer).await?;
    engine.offers.commit(offer.clone());
    drop(engine);

    let details = serde_json::json!({
        "case_id": offer.case_id,
        "deal_amount": offer.deal_amount(),
        "advance_paid": offer.advance_paid()
    });
    let _ = audit::log(&state.store, &actor, "offer.created", "offer", offer.id, details).await;

    Ok(HttpResponse::Created().json(offer))
}

/// PUT /api/v1/offers/{id} - Patch terms or statuses (own offers unless admin)
pub async fn update(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
    body: web::Json<OfferPatch>,
) -> Result<HttpResponse, AppError> {
    actor.require("offer.manage")?;
    let id = path.into_inner();

    let mut engine = state.engine.lock().await;
    let offer = engine.offers.plan_update(id, &body, &actor)?;
    state.store.save_offer(&offer).await?;
    engine.offers.commit(offer.clone());
    drop(engine);

    let details = serde_json::json!({
        "deal_amount": offer.deal_amount(),
        "advance_paid": offer.advance_paid(),
        "pending_amount": offer.pending_amount(),
        "payment_status": offer.payment_status
    });
    let _ = audit::log(&state.store, &actor, "offer.updated", "offer", id, details).await;

    Ok(HttpResponse::Ok().json(offer))
}

/// DELETE /api/v1/offers/{id} - No body required
pub async fn delete(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    actor.require("offer.manage")?;
    let id = path.into_inner();

    let mut engine = state.engine.lock().await;
    engine.offers.plan_delete(id, &actor)?;
    state.store.delete_offer(id).await?;
    let removed = engine.offers.delete(id, &actor)?;
    drop(engine);

    let details = serde_json::json!({ "case_id": removed.case_id, "deal_amount": removed.deal_amount() });
    let _ = audit::log(&state.store, &actor, "offer.deleted", "offer", id, details).await;

    Ok(HttpResponse::NoContent().finish())
}
