use actix_web::{HttpResponse, web};
use chrono::Utc;

use super::{Query, page_params};
use crate::api_types::PaginatedResponse;
use crate::audit;
use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::expense::{Expense, NewExpense};

/// GET /api/v1/expenses - Admins see every expense, everyone else their own
pub async fn list(
    state: web::Data<AppState>,
    actor: ActingUser,
    query: Query,
) -> Result<HttpResponse, AppError> {
    actor.require("expense.view")?;
    let (page, per_page) = page_params(&query);

    let engine = state.engine.lock().await;
    let items: Vec<Expense> = if actor.is_admin() {
        engine.expenses.list_all().to_vec()
    } else {
        engine.expenses.list_by_user(actor.user_id).into_iter().cloned().collect()
    };

    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(items, page, per_page)))
}

/// POST /api/v1/expenses - Record an outlay owned by the caller
pub async fn create(
    state: web::Data<AppState>,
    actor: ActingUser,
    body: web::Json<NewExpense>,
) -> Result<HttpResponse, AppError> {
    actor.require("expense.create")?;
    let now = Utc::now();

    let mut engine = state.engine.lock().await;
    let expense = engine.expenses.plan_record(&body, &actor, now)?;
    state.store.save_expense(&expense).await?;
    engine.expenses.commit(expense.clone());
    drop(engine);

    let details = serde_json::json!({
        "amount": expense.amount,
        "expense_type": expense.expense_type,
        "date": expense.date
    });
    let _ = audit::log(&state.store, &actor, "expense.created", "expense", expense.id, details).await;

    Ok(HttpResponse::Created().json(expense))
}
