pub mod call_logs;
pub mod cases;
pub mod dashboard;
pub mod expenses;
pub mod followups;
pub mod ledger;
pub mod offers;
pub mod users;

use std::collections::HashMap;

use actix_web::{
    web, Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header},
    middleware::Next,
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::AppError;

/// Query string as the handlers receive it.
pub type Query = web::Query<HashMap<String, String>>;

/// Whether the request announces a body. Unparseable lengths count as a body.
fn has_body(req: &ServiceRequest) -> bool {
    let headers = req.headers();
    if headers.contains_key(header::TRANSFER_ENCODING) {
        return true;
    }
    match headers.get(header::CONTENT_LENGTH) {
        Some(len) => len.to_str().ok().and_then(|v| v.trim().parse::<u64>().ok()) != Some(0),
        None => false,
    }
}

/// Rejects POST/PUT/DELETE requests whose body isn't Content-Type: application/json.
/// GET requests and bodiless actions (`/cases/{id}/start`, `DELETE /offers/{id}`) are exempt.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if (method == Method::POST || method == Method::PUT || method == Method::DELETE) && has_body(&req) {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "error": "unsupported_media_type",
                "details": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::UnsupportedMediaType().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// `page` (default 1) and `per_page` (default 25, capped at 100).
pub(crate) fn page_params(query: &HashMap<String, String>) -> (i64, i64) {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(25)
        .clamp(1, 100);
    (page, per_page)
}

/// Non-blank query value.
pub(crate) fn query_str<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Optional `YYYY-MM-DD` query value.
pub(crate) fn query_date(query: &HashMap<String, String>, key: &'static str) -> Result<Option<NaiveDate>, AppError> {
    query_str(query, key)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::validation(key, format!("'{raw}' is not a YYYY-MM-DD date")))
        })
        .transpose()
}

/// Optional RFC 3339 query value.
pub(crate) fn query_instant(query: &HashMap<String, String>, key: &'static str) -> Result<Option<DateTime<Utc>>, AppError> {
    query_str(query, key)
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| AppError::validation(key, format!("'{raw}' is not an RFC 3339 timestamp")))
        })
        .transpose()
}

/// Optional integer query value.
pub(crate) fn query_id(query: &HashMap<String, String>, key: &'static str) -> Result<Option<i64>, AppError> {
    query_str(query, key)
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| AppError::validation(key, format!("'{raw}' is not a number")))
        })
        .transpose()
}

/// Configure API v1 routes. Fixed segments are registered before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/followups")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(followups::list))
            .route("", web::post().to(followups::create))
            .route("/due", web::get().to(followups::due))
            .route("/{id}", web::get().to(followups::read))
            .route("/{id}/outcome", web::post().to(followups::record_outcome))
            .route("/{id}/status", web::put().to(followups::set_status)),
    );
    cfg.service(
        web::scope("/call-logs")
            .route("", web::get().to(call_logs::list)),
    );
    cfg.service(
        web::scope("/cases")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(cases::list))
            .route("", web::post().to(cases::create))
            .route("/assigned/{officer_id}", web::get().to(cases::assigned))
            .route("/{id}", web::get().to(cases::read))
            .route("/{id}", web::put().to(cases::update))
            .route("/{id}/assign", web::post().to(cases::assign))
            .route("/{id}/start", web::post().to(cases::start))
            .route("/{id}/complete", web::post().to(cases::complete)),
    );
    cfg.service(
        web::scope("/offers")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(offers::list))
            .route("", web::post().to(offers::create))
            .route("/agent/{agent_id}", web::get().to(offers::by_agent))
            .route("/{id}", web::put().to(offers::update))
            .route("/{id}", web::delete().to(offers::delete)),
    );
    cfg.service(
        web::scope("/expenses")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(expenses::list))
            .route("", web::post().to(expenses::create)),
    );
    cfg.service(web::scope("/ledger").route("", web::get().to(ledger::report)));
    cfg.service(
        web::scope("/users")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(users::list))
            .route("", web::post().to(users::create))
            .route("/{id}", web::get().to(users::read)),
    );
    cfg.service(web::scope("/dashboard").route("", web::get().to(dashboard::index)));
}
