use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::handlers::AppState;

/// GET /api/v1/dashboard - Counters for the caller's role
pub async fn index(state: web::Data<AppState>, actor: ActingUser) -> Result<HttpResponse, AppError> {
    let engine = state.engine.lock().await;
    Ok(HttpResponse::Ok().json(engine.dashboard(&actor, Utc::now())))
}
