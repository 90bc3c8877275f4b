//! The lifecycle engine: every registry plus the business timezone.
//!
//! Operations that touch more than one collection live here. Each comes as a
//! `plan_*` (validate and build, no mutation) and, where the HTTP layer needs
//! it, a matching `commit_*`; the one-shot forms do both and are what the
//! tests drive.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;

use crate::auth::ActingUser;
use crate::errors::AppError;
use crate::models::call_log::{CallLogEntry, CallLogJournal};
use crate::models::case::{self, Case, CaseBook, NewCase};
use crate::models::dashboard::{Dashboard, DashboardSources};
use crate::models::expense::{Expense, ExpenseBook, NewExpense};
use crate::models::followup::{CallOutcome, FollowUp, FollowUpRegistry};
use crate::models::ledger::{LedgerFilter, LedgerReport};
use crate::models::offer::{NewOffer, Offer, OfferBook};
use crate::models::user::{User, UserDirectory};

/// Everything loaded from the store at start-up.
#[derive(Debug, Default)]
pub struct EngineRecords {
    pub users: Vec<User>,
    pub follow_ups: Vec<FollowUp>,
    pub call_logs: Vec<CallLogEntry>,
    pub cases: Vec<Case>,
    pub offers: Vec<Offer>,
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone)]
pub struct Engine {
    tz: FixedOffset,
    pub users: UserDirectory,
    pub follow_ups: FollowUpRegistry,
    pub call_logs: CallLogJournal,
    pub cases: CaseBook,
    pub offers: OfferBook,
    pub expenses: ExpenseBook,
}

impl Engine {
    pub fn new(tz: FixedOffset) -> Self {
        Engine::with_records(tz, EngineRecords::default())
    }

    pub fn with_records(tz: FixedOffset, records: EngineRecords) -> Self {
        Engine {
            tz,
            users: UserDirectory::from_records(records.users),
            follow_ups: FollowUpRegistry::from_records(records.follow_ups),
            call_logs: CallLogJournal::from_records(records.call_logs),
            cases: CaseBook::from_records(records.cases),
            offers: OfferBook::from_records(records.offers),
            expenses: ExpenseBook::from_records(records.expenses),
        }
    }

    /// Business timezone used for every calendar-day question.
    pub fn tz(&self) -> &FixedOffset {
        &self.tz
    }

    // ---- follow-ups ----

    pub fn list_due_today(&self, now: DateTime<Utc>) -> Vec<&FollowUp> {
        self.follow_ups.list_due_today(now, &self.tz)
    }

    pub fn plan_outcome(
        &self,
        id: i64,
        outcome: &CallOutcome,
        now: DateTime<Utc>,
    ) -> Result<(FollowUp, CallLogEntry), AppError> {
        self.follow_ups.plan_outcome(id, outcome, &self.call_logs, now)
    }

    pub fn commit_outcome(&mut self, follow_up: FollowUp, entry: CallLogEntry) {
        self.follow_ups.commit(follow_up);
        self.call_logs.commit(entry);
    }

    pub fn record_outcome(
        &mut self,
        id: i64,
        outcome: &CallOutcome,
        now: DateTime<Utc>,
    ) -> Result<(FollowUp, CallLogEntry), AppError> {
        self.follow_ups.record_outcome(id, outcome, &mut self.call_logs, now)
    }

    // ---- cases ----

    pub fn plan_intake(&self, input: &NewCase, actor: &ActingUser, now: DateTime<Utc>) -> Result<Case, AppError> {
        self.cases.plan_intake(input, Some(actor.user_id), now)
    }

    pub fn plan_assign(
        &self,
        case_id: i64,
        officer_id: i64,
        amount: Option<Decimal>,
        start_work: bool,
        now: DateTime<Utc>,
    ) -> Result<Case, AppError> {
        self.cases
            .plan_assign(case_id, officer_id, amount, start_work, &self.users, now)
    }

    pub fn assign(
        &mut self,
        case_id: i64,
        officer_id: i64,
        amount: Option<Decimal>,
        start_work: bool,
        now: DateTime<Utc>,
    ) -> Result<Case, AppError> {
        self.cases
            .assign(case_id, officer_id, amount, start_work, &self.users, now)
    }

    /// Days the case has been with its officer, as of `now`.
    pub fn days_since_assigned(&self, case_id: i64, now: DateTime<Utc>) -> Result<Option<i64>, AppError> {
        let case = self
            .cases
            .get(case_id)
            .ok_or_else(|| AppError::not_found("case", case_id))?;
        Ok(case::days_since_assigned(case, now, &self.tz))
    }

    // ---- offers and expenses ----

    pub fn plan_create_offer(&self, input: &NewOffer, agent: &ActingUser, now: DateTime<Utc>) -> Result<Offer, AppError> {
        self.offers.plan_create(input, &self.cases, agent, now)
    }

    pub fn create_offer(&mut self, input: &NewOffer, agent: &ActingUser, now: DateTime<Utc>) -> Result<Offer, AppError> {
        self.offers.create(input, &self.cases, agent, now)
    }

    pub fn record_expense(&mut self, input: &NewExpense, owner: &ActingUser, now: DateTime<Utc>) -> Result<Expense, AppError> {
        self.expenses.record(input, owner, now)
    }

    // ---- reporting ----

    pub fn ledger_report(&self, filter: &LedgerFilter) -> LedgerReport {
        LedgerReport::build(
            self.offers.list_all(),
            self.expenses.list_all(),
            &self.cases,
            filter,
            &self.tz,
        )
    }

    pub fn dashboard(&self, actor: &ActingUser, now: DateTime<Utc>) -> Dashboard {
        DashboardSources {
            users: &self.users,
            follow_ups: &self.follow_ups,
            call_logs: &self.call_logs,
            cases: &self.cases,
            offers: &self.offers,
            expenses: &self.expenses,
        }
        .build(actor, now, &self.tz)
    }
}
