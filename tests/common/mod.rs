//! Shared test infrastructure for engine and API tests.
//!
//! - `seeded_engine()` - Engine with one user per role (plus a second officer)
//! - `test_state()` - The same engine behind `AppState` with in-memory storage
//! - `as_user()` - Attach identity headers to a test request

#![allow(dead_code)]

use actix_web::test::TestRequest;
use actix_web::web;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;

use caseflow::auth::context::{USER_ID_HEADER, USER_ROLE_HEADER};
use caseflow::auth::{ActingUser, Role};
use caseflow::db::Store;
use caseflow::engine::Engine;
use caseflow::handlers::AppState;
use caseflow::models::case::NewCase;
use caseflow::models::followup::NewFollowUp;
use caseflow::models::user::NewUser;

// ============================================================================
// TIME AND MONEY
// ============================================================================

/// India Standard Time, the default business offset.
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 1800).expect("valid offset")
}

/// Parse an RFC 3339 instant.
pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

pub fn dec(v: i64) -> Decimal {
    Decimal::new(v, 0)
}

// ============================================================================
// STAFF
// ============================================================================

pub struct Staff {
    pub admin: ActingUser,
    pub telecaller: ActingUser,
    pub officer: ActingUser,
    pub second_officer: ActingUser,
    pub marketing: ActingUser,
}

/// Engine in IST with one user per role.
pub fn seeded_engine() -> (Engine, Staff) {
    let mut engine = Engine::new(ist());
    let now = at("2024-01-01T08:00:00+05:30");
    let mut add = |username: &str, role: Role| {
        let user = engine
            .users
            .create(
                &NewUser {
                    username: username.to_string(),
                    display_name: String::new(),
                    email: format!("{username}@loanfix.in"),
                    role,
                },
                now,
            )
            .expect("seed user");
        ActingUser::new(user.id, role)
    };

    let staff = Staff {
        admin: add("admin", Role::Admin),
        telecaller: add("pooja", Role::Telecaller),
        officer: add("vikram", Role::Officer),
        second_officer: add("aarti", Role::Officer),
        marketing: add("sameer", Role::Marketing),
    };
    (engine, staff)
}

pub fn test_state(engine: Engine) -> web::Data<AppState> {
    web::Data::new(AppState::new(engine, Store::Memory))
}

pub fn as_user(req: TestRequest, actor: &ActingUser) -> TestRequest {
    req.insert_header((USER_ID_HEADER, actor.user_id.to_string()))
        .insert_header((USER_ROLE_HEADER, actor.role.as_str()))
}

// ============================================================================
// INPUTS
// ============================================================================

pub fn new_lead(name: &str, phone: &str) -> NewFollowUp {
    NewFollowUp {
        name: name.to_string(),
        phone: phone.to_string(),
        issue_type: "EMI overdue".to_string(),
        village: "Borsad".to_string(),
    }
}

pub fn new_case(customer_name: &str) -> NewCase {
    NewCase {
        customer_name: customer_name.to_string(),
        phone: "9876501234".to_string(),
        email: String::new(),
        problem: "Recovery agents calling after settlement".to_string(),
        bank: "Bank of Baroda".to_string(),
        loan_type: "Gold loan".to_string(),
    }
}
