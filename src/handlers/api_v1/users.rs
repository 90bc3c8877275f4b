use actix_web::{HttpResponse, web};
use chrono::Utc;

use super::{Query, page_params, query_str};
use crate::api_types::PaginatedResponse;
use crate::audit;
use crate::auth::{ActingUser, Role};
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::user::{NewUser, User};

/// GET /api/v1/users - List users with pagination
/// Query params: role (optional), page (default 1), per_page (default 25)
pub async fn list(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("users.list")?;
    let (page, per_page) = page_params(&query);
    let role = query_str(&query, "role")
        .map(|raw| Role::parse(raw).ok_or_else(|| AppError::validation("role", format!("Unknown role '{raw}'"))))
        .transpose()?;

    let engine = state.engine.lock().await;
    let items: Vec<User> = match role {
        Some(role) => engine.users.list_by_role(role).into_iter().cloned().collect(),
        None => engine.users.list_all().to_vec(),
    };

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}

/// GET /api/v1/users/{id} - Get single user by ID
pub async fn read(
    state: web::Data<AppState>,
    actor: ActingUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    actor.require("users.list")?;
    let id = path.into_inner();

    let engine = state.engine.lock().await;
    let user = engine.users.get(id).ok_or_else(|| AppError::not_found("user", id))?;

    Ok(HttpResponse::Ok().json(user))
}

/// POST /api/v1/users - Create new user
pub async fn create(
    state: web::Data<AppState>,
    actor: ActingUser,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, AppError> {
    actor.require("users.manage")?;

    let mut engine = state.engine.lock().await;
    let user = engine.users.plan_create(&body, Utc::now())?;
    state.store.save_user(&user).await?;
    engine.users.commit(user.clone());
    drop(engine);

    let details = serde_json::json!({
        "username": user.username,
        "email": user.email,
        "role": user.role,
        "summary": "User created via API"
    });
    let _ = audit::log(&state.store, &actor, "user.created", "user", user.id, details).await;

    Ok(HttpResponse::Created().json(user))
}
