pub mod api_v1;

use actix_web::{HttpResponse, web};
use tokio::sync::Mutex;

use crate::db::Store;
use crate::engine::Engine;
use crate::errors::AppError;

/// Shared per-process state. The engine lock is held from plan through store
/// write to commit, so writers never interleave.
pub struct AppState {
    pub engine: Mutex<Engine>,
    pub store: Store,
}

impl AppState {
    pub fn new(engine: Engine, store: Store) -> Self {
        AppState { engine: Mutex::new(engine), store }
    }
}

/// Malformed JSON bodies surface as validation errors instead of actix's plain-text 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::validation("body", err.to_string()).into())
}

/// Mount the JSON API. Callers add `web::Data<AppState>` themselves.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::scope("/api/v1").configure(api_v1::configure));
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "not_found" }))
}
