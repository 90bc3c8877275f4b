use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::api_types::ApiErrorResponse;

#[derive(Debug)]
pub enum AppError {
    /// Malformed or incomplete input. `field` names the offending input field.
    Validation { field: &'static str, reason: String },
    NotFound { entity: &'static str, id: i64 },
    /// Illegal state transition (assigning twice, completing an unassigned case, ...).
    Conflict(String),
    Unauthorized(String),
    PermissionDenied(String),
    Db(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
    Config(String),
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::Validation { field, reason: reason.into() }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    /// Short machine-readable kind used as the `error` member of API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::PermissionDenied(_) => "permission_denied",
            AppError::Db(_) | AppError::Migrate(_) | AppError::Config(_) => "internal_error",
        }
    }

    /// Offending field for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AppError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { field, reason } => write!(f, "Invalid {field}: {reason}"),
            AppError::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            AppError::Conflict(e) => write!(f, "Conflict: {e}"),
            AppError::Unauthorized(e) => write!(f, "Unauthorized: {e}"),
            AppError::PermissionDenied(e) => write!(f, "Permission denied: {e}"),
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Migrate(e) => write!(f, "Migration error: {e}"),
            AppError::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Db(_) | AppError::Migrate(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            AppError::Db(_) | AppError::Migrate(_) | AppError::Config(_) => {
                log::error!("{self}");
                None
            }
            _ => Some(self.to_string()),
        };
        HttpResponse::build(self.status_code()).json(ApiErrorResponse {
            error: self.kind().to_string(),
            field: self.field().map(str::to_string),
            details,
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Migrate(e)
    }
}
