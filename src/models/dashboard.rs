use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::auth::{ActingUser, Role};
use crate::models::calendar::calendar_date;
use crate::models::call_log::CallLogJournal;
use crate::models::case::{CaseBook, CaseStatus, days_since_assigned};
use crate::models::expense::ExpenseBook;
use crate::models::followup::{FollowUpRegistry, FollowUpStatus};
use crate::models::ledger::{LedgerFilter, LedgerReport, LedgerTotals};
use crate::models::offer::{AgentOfferStats, OfferBook};
use crate::models::user::UserDirectory;

// ---------- Types ----------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelecallerSummary {
    pub due_today: usize,
    pub pending: usize,
    pub call_back: usize,
    pub completed: usize,
    pub rejected: usize,
    pub calls_today: usize,
    /// Cases this telecaller captured.
    pub cases_created: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficerSummary {
    pub assigned: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub solved: usize,
    /// Longest wait among unsolved assigned cases, in calendar days.
    pub oldest_open_days: Option<i64>,
    pub offers: AgentOfferStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminSummary {
    pub users: usize,
    pub officers: usize,
    pub cases_total: usize,
    pub cases_unassigned: usize,
    pub cases_pending: usize,
    pub cases_in_progress: usize,
    pub cases_solved: usize,
    pub follow_ups_due_today: usize,
    pub calls_today: usize,
    pub ledger: LedgerTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingSummary {
    pub expenses_recorded: usize,
    pub expense_total: Decimal,
    pub advance_total: Decimal,
    pub expenses_this_month: usize,
    pub follow_ups_due_today: usize,
}

/// Role-specific counters, tagged with the role they were built for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Telecaller(TelecallerSummary),
    Officer(OfficerSummary),
    Admin(AdminSummary),
    Marketing(MarketingSummary),
}

/// Borrowed view of every collection a dashboard may read.
pub struct DashboardSources<'a> {
    pub users: &'a UserDirectory,
    pub follow_ups: &'a FollowUpRegistry,
    pub call_logs: &'a CallLogJournal,
    pub cases: &'a CaseBook,
    pub offers: &'a OfferBook,
    pub expenses: &'a ExpenseBook,
}

// ---------- Builders ----------

impl DashboardSources<'_> {
    pub fn build(&self, actor: &ActingUser, now: DateTime<Utc>, tz: &FixedOffset) -> Dashboard {
        match actor.role {
            Role::Telecaller => Dashboard::Telecaller(self.telecaller(actor.user_id, now, tz)),
            Role::Officer => Dashboard::Officer(self.officer(actor.user_id, now, tz)),
            Role::Admin => Dashboard::Admin(self.admin(now, tz)),
            Role::Marketing => Dashboard::Marketing(self.marketing(actor.user_id, now, tz)),
        }
    }

    fn telecaller(&self, user_id: i64, now: DateTime<Utc>, tz: &FixedOffset) -> TelecallerSummary {
        TelecallerSummary {
            due_today: self.follow_ups.list_due_today(now, tz).len(),
            pending: self.follow_ups.count_by_status(FollowUpStatus::Pending),
            call_back: self.follow_ups.count_by_status(FollowUpStatus::CallBack),
            completed: self.follow_ups.count_by_status(FollowUpStatus::Completed),
            rejected: self.follow_ups.count_by_status(FollowUpStatus::Rejected),
            calls_today: self.call_logs.count_on(calendar_date(now, tz), tz),
            cases_created: self
                .cases
                .list_all()
                .iter()
                .filter(|c| c.telecaller_id == Some(user_id))
                .count(),
        }
    }

    fn officer(&self, user_id: i64, now: DateTime<Utc>, tz: &FixedOffset) -> OfficerSummary {
        let assigned = self.cases.list_assigned_to(user_id);
        let count = |status: CaseStatus| assigned.iter().filter(|c| c.status == status).count();
        OfficerSummary {
            assigned: assigned.len(),
            pending: count(CaseStatus::Pending),
            in_progress: count(CaseStatus::InProgress),
            solved: count(CaseStatus::Solved),
            oldest_open_days: assigned
                .iter()
                .filter(|c| c.status != CaseStatus::Solved)
                .filter_map(|c| days_since_assigned(c, now, tz))
                .max(),
            offers: self.offers.agent_stats(user_id),
        }
    }

    fn admin(&self, now: DateTime<Utc>, tz: &FixedOffset) -> AdminSummary {
        let cases = self.cases.list_all();
        let ledger = LedgerReport::build(
            self.offers.list_all(),
            self.expenses.list_all(),
            self.cases,
            &LedgerFilter::default(),
            tz,
        );
        AdminSummary {
            users: self.users.list_all().len(),
            officers: self.users.list_by_role(Role::Officer).len(),
            cases_total: cases.len(),
            cases_unassigned: cases.iter().filter(|c| c.assignment.is_none()).count(),
            cases_pending: self.cases.count_by_status(CaseStatus::Pending),
            cases_in_progress: self.cases.count_by_status(CaseStatus::InProgress),
            cases_solved: self.cases.count_by_status(CaseStatus::Solved),
            follow_ups_due_today: self.follow_ups.list_due_today(now, tz).len(),
            calls_today: self.call_logs.count_on(calendar_date(now, tz), tz),
            ledger: ledger.overall,
        }
    }

    fn marketing(&self, user_id: i64, now: DateTime<Utc>, tz: &FixedOffset) -> MarketingSummary {
        let mine = self.expenses.list_by_user(user_id);
        let today = calendar_date(now, tz);
        let this_month = |d: &NaiveDate| d.year() == today.year() && d.month() == today.month();
        MarketingSummary {
            expenses_recorded: mine.len(),
            expense_total: mine.iter().map(|e| e.amount).sum(),
            advance_total: mine.iter().map(|e| e.advance).sum(),
            expenses_this_month: mine.iter().filter(|e| this_month(&e.date)).count(),
            follow_ups_due_today: self.follow_ups.list_due_today(now, tz).len(),
        }
    }
}
