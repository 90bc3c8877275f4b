use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;

use super::types::*;
use crate::auth::ActingUser;
use crate::auth::validate::{
    validate_customer_phone, validate_email, validate_positive_amount, validate_required,
};
use crate::errors::AppError;
use crate::models::calendar::whole_days_between;
use crate::models::user::UserDirectory;

pub const CIBIL_MIN: u16 = 300;
pub const CIBIL_MAX: u16 = 900;

/// All cases, keyed by id, driving the Unassigned -> Assigned -> Solved lifecycle.
#[derive(Debug, Clone)]
pub struct CaseBook {
    cases: Vec<Case>,
    next_id: i64,
}

impl Default for CaseBook {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_cibil(score: Option<u16>, field: &'static str, label: &str) -> Result<u16, AppError> {
    let score = score.ok_or_else(|| AppError::validation(field, format!("{label} is required")))?;
    if !(CIBIL_MIN..=CIBIL_MAX).contains(&score) {
        return Err(AppError::validation(
            field,
            format!("{label} must be between {CIBIL_MIN} and {CIBIL_MAX}"),
        ));
    }
    Ok(score)
}

fn validate_case_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Ok(());
    }
    validate_email(email)
}

impl CaseBook {
    pub fn new() -> Self {
        CaseBook { cases: Vec::new(), next_id: 1 }
    }

    pub fn from_records(mut cases: Vec<Case>) -> Self {
        cases.sort_by_key(|c| c.id);
        let next_id = cases.last().map_or(1, |c| c.id + 1);
        CaseBook { cases, next_id }
    }

    pub fn get(&self, id: i64) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    fn require(&self, id: i64) -> Result<&Case, AppError> {
        self.get(id).ok_or_else(|| AppError::not_found("case", id))
    }

    pub fn list_all(&self) -> &[Case] {
        &self.cases
    }

    pub fn commit(&mut self, case: Case) {
        self.next_id = self.next_id.max(case.id + 1);
        match self.cases.iter_mut().find(|c| c.id == case.id) {
            Some(existing) => *existing = case,
            None => self.cases.push(case),
        }
    }

    // ---- intake ----

    pub fn plan_intake(
        &self,
        input: &NewCase,
        telecaller_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Case, AppError> {
        validate_required(&input.customer_name, "customer_name", "Customer name", 100)?;
        validate_customer_phone(&input.phone)?;
        validate_case_email(&input.email)?;
        validate_required(&input.problem, "problem", "Problem description", 2000)?;
        validate_required(&input.bank, "bank", "Bank", 100)?;
        validate_required(&input.loan_type, "loan_type", "Loan type", 100)?;

        Ok(Case {
            id: self.next_id,
            customer_name: input.customer_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email.trim().to_string(),
            problem: input.problem.trim().to_string(),
            bank: input.bank.trim().to_string(),
            loan_type: input.loan_type.trim().to_string(),
            amount: None,
            status: CaseStatus::Pending,
            assignment: None,
            cibil_before: None,
            cibil_after: None,
            resolved_date: None,
            telecaller_id,
            created_at: now,
        })
    }

    pub fn intake(&mut self, input: &NewCase, telecaller_id: Option<i64>, now: DateTime<Utc>) -> Result<Case, AppError> {
        let case = self.plan_intake(input, telecaller_id, now)?;
        self.commit(case.clone());
        log::info!("case {} opened for '{}'", case.id, case.customer_name);
        Ok(case)
    }

    // ---- assignment ----

    /// Unassigned -> Assigned. A case is assigned once; re-assignment and
    /// assigning a Solved case are conflicts.
    pub fn plan_assign(
        &self,
        id: i64,
        officer_id: i64,
        amount: Option<Decimal>,
        start_work: bool,
        users: &UserDirectory,
        now: DateTime<Utc>,
    ) -> Result<Case, AppError> {
        let current = self.require(id)?;
        match current.stage() {
            CaseStage::Unassigned => {}
            CaseStage::Assigned => {
                log::warn!("case {id} is already assigned, refusing re-assignment to {officer_id}");
                return Err(AppError::Conflict(format!("case {id} is already assigned")));
            }
            CaseStage::Solved => {
                log::warn!("case {id} is solved, refusing assignment");
                return Err(AppError::Conflict(format!("case {id} is already solved")));
            }
        }

        let amount = amount.ok_or_else(|| AppError::validation("amount", "Amount is required"))?;
        validate_positive_amount(amount, "amount", "Amount")?;
        users.require_officer(officer_id)?;

        let mut updated = current.clone();
        updated.assignment = Some(Assignment { officer_id, assigned_date: now });
        updated.amount = Some(amount);
        if start_work {
            updated.status = CaseStatus::InProgress;
        }
        Ok(updated)
    }

    pub fn assign(
        &mut self,
        id: i64,
        officer_id: i64,
        amount: Option<Decimal>,
        start_work: bool,
        users: &UserDirectory,
        now: DateTime<Utc>,
    ) -> Result<Case, AppError> {
        let case = self.plan_assign(id, officer_id, amount, start_work, users, now)?;
        self.commit(case.clone());
        log::info!("case {id} assigned to officer {officer_id}");
        Ok(case)
    }

    /// Pending -> In Progress for an assigned case. Already in progress is a no-op.
    pub fn plan_start_work(&self, id: i64, actor: &ActingUser) -> Result<Case, AppError> {
        let current = self.require(id)?;
        if current.stage() != CaseStage::Assigned {
            return Err(AppError::Conflict(format!(
                "case {id} must be assigned and unsolved to start work"
            )));
        }
        Self::check_owner(current, actor)?;

        let mut updated = current.clone();
        updated.status = CaseStatus::InProgress;
        Ok(updated)
    }

    pub fn start_work(&mut self, id: i64, actor: &ActingUser) -> Result<Case, AppError> {
        let case = self.plan_start_work(id, actor)?;
        self.commit(case.clone());
        log::info!("case {id} in progress");
        Ok(case)
    }

    // ---- resolution ----

    /// Assigned -> Solved, recording the before/after CIBIL scores.
    pub fn plan_complete(
        &self,
        id: i64,
        cibil_before: Option<u16>,
        cibil_after: Option<u16>,
        actor: &ActingUser,
        now: DateTime<Utc>,
    ) -> Result<Case, AppError> {
        let current = self.require(id)?;
        match current.stage() {
            CaseStage::Assigned => {}
            CaseStage::Unassigned => {
                log::warn!("case {id} completed before assignment");
                return Err(AppError::Conflict(format!("case {id} has not been assigned")));
            }
            CaseStage::Solved => {
                return Err(AppError::Conflict(format!("case {id} is already solved")));
            }
        }
        Self::check_owner(current, actor)?;

        let before = validate_cibil(cibil_before, "cibil_before", "CIBIL score before")?;
        let after = validate_cibil(cibil_after, "cibil_after", "CIBIL score after")?;

        let mut updated = current.clone();
        updated.status = CaseStatus::Solved;
        updated.cibil_before = Some(before);
        updated.cibil_after = Some(after);
        updated.resolved_date = Some(now);
        Ok(updated)
    }

    pub fn complete(
        &mut self,
        id: i64,
        cibil_before: Option<u16>,
        cibil_after: Option<u16>,
        actor: &ActingUser,
        now: DateTime<Utc>,
    ) -> Result<Case, AppError> {
        let case = self.plan_complete(id, cibil_before, cibil_after, actor, now)?;
        self.commit(case.clone());
        log::info!("case {id} solved (CIBIL {:?} -> {:?})", case.cibil_before, case.cibil_after);
        Ok(case)
    }

    /// Officers act on their own cases only; admins on any.
    fn check_owner(case: &Case, actor: &ActingUser) -> Result<(), AppError> {
        if actor.is_admin() || case.assigned_to() == Some(actor.user_id) {
            return Ok(());
        }
        log::warn!("user {} tried to work case {} assigned to {:?}", actor.user_id, case.id, case.assigned_to());
        Err(AppError::PermissionDenied(format!("case {} is not assigned to you", case.id)))
    }

    // ---- edits ----

    pub fn plan_edit(&self, id: i64, patch: &CasePatch) -> Result<Case, AppError> {
        let current = self.require(id)?;
        if current.stage() == CaseStage::Solved {
            return Err(AppError::Conflict(format!("case {id} is solved and can no longer be edited")));
        }

        let mut updated = current.clone();
        if let Some(name) = &patch.customer_name {
            validate_required(name, "customer_name", "Customer name", 100)?;
            updated.customer_name = name.trim().to_string();
        }
        if let Some(phone) = &patch.phone {
            validate_customer_phone(phone)?;
            updated.phone = phone.trim().to_string();
        }
        if let Some(email) = &patch.email {
            validate_case_email(email)?;
            updated.email = email.trim().to_string();
        }
        if let Some(problem) = &patch.problem {
            validate_required(problem, "problem", "Problem description", 2000)?;
            updated.problem = problem.trim().to_string();
        }
        if let Some(bank) = &patch.bank {
            validate_required(bank, "bank", "Bank", 100)?;
            updated.bank = bank.trim().to_string();
        }
        if let Some(loan_type) = &patch.loan_type {
            validate_required(loan_type, "loan_type", "Loan type", 100)?;
            updated.loan_type = loan_type.trim().to_string();
        }
        if let Some(amount) = patch.amount {
            validate_positive_amount(amount, "amount", "Amount")?;
            updated.amount = Some(amount);
        }
        if patch.cibil_before.is_some() {
            updated.cibil_before = Some(validate_cibil(patch.cibil_before, "cibil_before", "CIBIL score before")?);
        }
        if patch.cibil_after.is_some() {
            updated.cibil_after = Some(validate_cibil(patch.cibil_after, "cibil_after", "CIBIL score after")?);
        }
        Ok(updated)
    }

    pub fn edit(&mut self, id: i64, patch: &CasePatch) -> Result<Case, AppError> {
        let case = self.plan_edit(id, patch)?;
        self.commit(case.clone());
        log::info!("case {id} edited");
        Ok(case)
    }

    // ---- reads ----

    pub fn list_assigned_to(&self, officer_id: i64) -> Vec<&Case> {
        self.cases
            .iter()
            .filter(|c| c.assigned_to() == Some(officer_id))
            .collect()
    }

    pub fn list(&self, filter: &CaseFilter) -> Vec<&Case> {
        self.cases.iter().filter(|c| filter.matches(c)).collect()
    }

    pub fn count_by_status(&self, status: CaseStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }
}

/// Whole calendar days the case has sat with its officer; `None` while unassigned.
pub fn days_since_assigned(case: &Case, now: DateTime<Utc>, tz: &FixedOffset) -> Option<i64> {
    case.assignment
        .map(|a| whole_days_between(a.assigned_date, now, tz))
}
