/// Integration tests for the case lifecycle: intake, assignment, work and
/// resolution, plus the officer dashboard that reads from it.

use caseflow::errors::AppError;
use caseflow::models::case::{CasePatch, CaseStage, CaseStatus};
use caseflow::models::dashboard::Dashboard;

mod common;
use common::{at, dec, new_case, seeded_engine};

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

#[test]
fn test_assign_then_complete_full_lifecycle() {
    let (mut engine, staff) = seeded_engine();
    let day0 = at("2024-02-01T11:00:00+05:30");
    let case = engine
        .cases
        .intake(&new_case("Ravi Desai"), Some(staff.telecaller.user_id), day0)
        .expect("intake");
    assert_eq!(case.stage(), CaseStage::Unassigned);
    assert_eq!(case.status, CaseStatus::Pending);
    assert_eq!(engine.days_since_assigned(case.id, day0).expect("case"), None);

    let assigned = engine
        .assign(case.id, staff.officer.user_id, Some(dec(25000)), false, day0)
        .expect("assign");
    assert_eq!(assigned.stage(), CaseStage::Assigned);
    assert_eq!(assigned.assigned_to(), Some(staff.officer.user_id));
    assert_eq!(assigned.amount, Some(dec(25000)));
    assert_eq!(assigned.status, CaseStatus::Pending);

    let day5 = at("2024-02-06T09:30:00+05:30");
    assert_eq!(engine.days_since_assigned(case.id, day5).expect("case"), Some(5));

    let solved = engine
        .cases
        .complete(case.id, Some(650), Some(710), &staff.officer, day5)
        .expect("complete");
    assert_eq!(solved.status, CaseStatus::Solved);
    assert_eq!(solved.stage(), CaseStage::Solved);
    assert_eq!(solved.cibil_before, Some(650));
    assert_eq!(solved.cibil_after, Some(710));
    assert_eq!(solved.resolved_date, Some(day5));
}

#[test]
fn test_days_since_assigned_counts_calendar_days() {
    let (mut engine, staff) = seeded_engine();
    let late_evening = at("2024-02-01T23:50:00+05:30");
    let case = engine.cases.intake(&new_case("Sunita"), None, late_evening).expect("intake");
    engine
        .assign(case.id, staff.officer.user_id, Some(dec(5000)), false, late_evening)
        .expect("assign");

    // Ten minutes later is already the next calendar day.
    assert_eq!(
        engine.days_since_assigned(case.id, at("2024-02-02T00:00:00+05:30")).expect("case"),
        Some(1)
    );
    assert_eq!(
        engine.days_since_assigned(case.id, at("2024-02-01T23:59:00+05:30")).expect("case"),
        Some(0)
    );
    assert!(matches!(
        engine.days_since_assigned(999, late_evening),
        Err(AppError::NotFound { entity: "case", .. })
    ));
}

#[test]
fn test_second_assignment_conflicts_and_keeps_first() {
    let (mut engine, staff) = seeded_engine();
    let day0 = at("2024-02-01T11:00:00+05:30");
    let case = engine.cases.intake(&new_case("Ravi Desai"), None, day0).expect("intake");
    engine
        .assign(case.id, staff.officer.user_id, Some(dec(25000)), false, day0)
        .expect("first assign");

    let later = at("2024-02-03T11:00:00+05:30");
    let err = engine
        .assign(case.id, staff.second_officer.user_id, Some(dec(30000)), false, later)
        .expect_err("second assign");
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = engine.cases.get(case.id).expect("case");
    assert_eq!(stored.assigned_to(), Some(staff.officer.user_id));
    assert_eq!(stored.amount, Some(dec(25000)));
    assert_eq!(stored.assignment.expect("assignment").assigned_date, day0);
}

#[test]
fn test_assign_validates_amount_and_officer() {
    let (mut engine, staff) = seeded_engine();
    let now = at("2024-02-01T11:00:00+05:30");
    let case = engine.cases.intake(&new_case("Ravi Desai"), None, now).expect("intake");

    let err = engine
        .assign(case.id, staff.officer.user_id, None, false, now)
        .expect_err("missing amount");
    assert_eq!(err.field(), Some("amount"));

    let err = engine
        .assign(case.id, staff.officer.user_id, Some(dec(-10)), false, now)
        .expect_err("negative amount");
    assert_eq!(err.field(), Some("amount"));

    let err = engine
        .assign(case.id, staff.telecaller.user_id, Some(dec(1000)), false, now)
        .expect_err("telecaller is not an officer");
    assert_eq!(err.field(), Some("officer_id"));

    assert_eq!(engine.cases.get(case.id).expect("case").stage(), CaseStage::Unassigned);
}

#[test]
fn test_assign_with_start_work_moves_to_in_progress() {
    let (mut engine, staff) = seeded_engine();
    let now = at("2024-02-01T11:00:00+05:30");
    let case = engine.cases.intake(&new_case("Manoj"), None, now).expect("intake");
    let assigned = engine
        .assign(case.id, staff.officer.user_id, Some(dec(8000)), true, now)
        .expect("assign");
    assert_eq!(assigned.status, CaseStatus::InProgress);
    assert_eq!(assigned.stage(), CaseStage::Assigned);
}

// ---------------------------------------------------------------------------
// Work and resolution
// ---------------------------------------------------------------------------

#[test]
fn test_complete_before_assignment_conflicts() {
    let (mut engine, staff) = seeded_engine();
    let now = at("2024-02-01T11:00:00+05:30");
    let case = engine.cases.intake(&new_case("Farah"), None, now).expect("intake");

    let err = engine
        .cases
        .complete(case.id, Some(600), Some(700), &staff.admin, now)
        .expect_err("not assigned");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(engine.cases.get(case.id).expect("case").status, CaseStatus::Pending);
}

#[test]
fn test_only_assigned_officer_or_admin_can_work_case() {
    let (mut engine, staff) = seeded_engine();
    let now = at("2024-02-01T11:00:00+05:30");
    let case = engine.cases.intake(&new_case("Farah"), None, now).expect("intake");
    engine
        .assign(case.id, staff.officer.user_id, Some(dec(12000)), false, now)
        .expect("assign");

    assert!(matches!(
        engine.cases.start_work(case.id, &staff.second_officer),
        Err(AppError::PermissionDenied(_))
    ));
    assert!(matches!(
        engine.cases.complete(case.id, Some(600), Some(700), &staff.second_officer, now),
        Err(AppError::PermissionDenied(_))
    ));

    let started = engine.cases.start_work(case.id, &staff.officer).expect("start");
    assert_eq!(started.status, CaseStatus::InProgress);
    let solved = engine
        .cases
        .complete(case.id, Some(600), Some(700), &staff.admin, now)
        .expect("admin completes");
    assert_eq!(solved.status, CaseStatus::Solved);
}

#[test]
fn test_complete_requires_scores_in_range() {
    let (mut engine, staff) = seeded_engine();
    let now = at("2024-02-01T11:00:00+05:30");
    let case = engine.cases.intake(&new_case("Farah"), None, now).expect("intake");
    engine
        .assign(case.id, staff.officer.user_id, Some(dec(12000)), false, now)
        .expect("assign");

    let err = engine
        .cases
        .complete(case.id, None, Some(700), &staff.officer, now)
        .expect_err("missing before");
    assert_eq!(err.field(), Some("cibil_before"));

    let err = engine
        .cases
        .complete(case.id, Some(650), Some(950), &staff.officer, now)
        .expect_err("after out of range");
    assert_eq!(err.field(), Some("cibil_after"));

    let stored = engine.cases.get(case.id).expect("case");
    assert_eq!(stored.stage(), CaseStage::Assigned);
    assert_eq!(stored.cibil_before, None);
}

#[test]
fn test_solved_case_is_terminal() {
    let (mut engine, staff) = seeded_engine();
    let now = at("2024-02-01T11:00:00+05:30");
    let case = engine.cases.intake(&new_case("Gopal"), None, now).expect("intake");
    engine
        .assign(case.id, staff.officer.user_id, Some(dec(12000)), false, now)
        .expect("assign");
    let solved = engine
        .cases
        .complete(case.id, Some(610), Some(690), &staff.officer, now)
        .expect("complete");

    let patch = CasePatch { bank: Some("SBI".into()), ..Default::default() };
    assert!(matches!(engine.cases.edit(case.id, &patch), Err(AppError::Conflict(_))));
    assert!(matches!(
        engine.assign(case.id, staff.second_officer.user_id, Some(dec(1)), false, now),
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        engine.cases.complete(case.id, Some(700), Some(750), &staff.officer, now),
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(engine.cases.start_work(case.id, &staff.officer), Err(AppError::Conflict(_))));
    assert_eq!(engine.cases.get(case.id), Some(&solved));
}

// ---------------------------------------------------------------------------
// Intake and reads
// ---------------------------------------------------------------------------

#[test]
fn test_intake_validates_phone_and_email() {
    let (mut engine, staff) = seeded_engine();
    let now = at("2024-02-01T11:00:00+05:30");

    let mut input = new_case("Hema");
    input.phone = "98765".into();
    let err = engine
        .cases
        .intake(&input, Some(staff.telecaller.user_id), now)
        .expect_err("short phone");
    assert_eq!(err.field(), Some("phone"));

    let mut input = new_case("Hema");
    input.email = "not-an-email".into();
    let err = engine.cases.intake(&input, None, now).expect_err("bad email");
    assert_eq!(err.field(), Some("email"));

    assert!(engine.cases.list_all().is_empty());
}

#[test]
fn test_officer_dashboard_tracks_assigned_cases() {
    let (mut engine, staff) = seeded_engine();
    let day0 = at("2024-02-01T11:00:00+05:30");
    for name in ["Asha", "Bharat", "Chetan"] {
        let case = engine.cases.intake(&new_case(name), None, day0).expect("intake");
        engine
            .assign(case.id, staff.officer.user_id, Some(dec(10000)), false, day0)
            .expect("assign");
    }
    engine
        .cases
        .complete(1, Some(600), Some(680), &staff.officer, day0)
        .expect("complete");
    engine.cases.start_work(2, &staff.officer).expect("start");

    let Dashboard::Officer(summary) = engine.dashboard(&staff.officer, at("2024-02-04T10:00:00+05:30")) else {
        panic!("officer dashboard expected");
    };
    assert_eq!(summary.assigned, 3);
    assert_eq!(summary.solved, 1);
    assert_eq!(summary.in_progress, 1);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.oldest_open_days, Some(3));
    assert_eq!(summary.offers.total_offers, 0);

    let Dashboard::Officer(other) = engine.dashboard(&staff.second_officer, day0) else {
        panic!("officer dashboard expected");
    };
    assert_eq!(other.assigned, 0);
    assert_eq!(other.oldest_open_days, None);
}
