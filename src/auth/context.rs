use std::fmt;
use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Header carrying the authenticated user id, set by the identity layer in front of the service.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Telecaller,
    Marketing,
    Officer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Telecaller => "telecaller",
            Role::Marketing => "marketing",
            Role::Officer => "officer",
        }
    }

    /// Accepts the stored code as well as the front end's "agent" alias for officers.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "telecaller" => Some(Role::Telecaller),
            "marketing" => Some(Role::Marketing),
            "officer" | "agent" => Some(Role::Officer),
            _ => None,
        }
    }

    pub fn permissions(self) -> Permissions {
        let codes: &[&str] = match self {
            Role::Admin => &["*"],
            Role::Telecaller => &[
                "followup.view",
                "followup.manage",
                "case.view",
                "case.create",
            ],
            Role::Officer => &["case.view", "case.work", "offer.view", "offer.manage"],
            Role::Marketing => &["expense.view", "expense.create", "followup.view"],
        };
        Permissions(codes.iter().map(|c| c.to_string()).collect())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission codes granted to a role. `*` grants everything.
#[derive(Debug, Clone, Default)]
pub struct Permissions(pub Vec<String>);

impl Permissions {
    pub fn has(&self, code: &str) -> bool {
        self.0.iter().any(|p| p == "*" || p == code)
    }
}

/// The user on whose behalf an operation runs. Passed explicitly into every
/// operation that needs attribution or ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActingUser {
    pub user_id: i64,
    pub role: Role,
}

impl ActingUser {
    pub fn new(user_id: i64, role: Role) -> Self {
        ActingUser { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check permission; returns Err(AppError) if denied.
    pub fn require(&self, code: &str) -> Result<(), AppError> {
        if self.role.permissions().has(code) {
            Ok(())
        } else {
            log::warn!("user {} ({}) denied '{}'", self.user_id, self.role, code);
            Err(AppError::PermissionDenied(code.to_string()))
        }
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, AppError> {
        let user_id = header_value(req, USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing user id".into()))?
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("user id must be numeric".into()))?;
        let role = header_value(req, USER_ROLE_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing user role".into()))
            .and_then(|raw| {
                Role::parse(raw).ok_or_else(|| AppError::Unauthorized(format!("unknown role '{raw}'")))
            })?;

        Ok(ActingUser { user_id, role })
    }
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl FromRequest for ActingUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}
