use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::types::*;
use crate::auth::ActingUser;
use crate::auth::validate::validate_optional;
use crate::errors::AppError;
use crate::models::case::{CaseBook, CaseStage};

/// Offers by id. At most one offer exists per case.
#[derive(Debug, Clone)]
pub struct OfferBook {
    offers: Vec<Offer>,
    next_id: i64,
}

impl Default for OfferBook {
    fn default() -> Self {
        Self::new()
    }
}

fn clean_proof(proof: Option<&String>) -> Result<Option<String>, AppError> {
    match proof.map(|p| p.trim()) {
        Some(p) if !p.is_empty() => {
            validate_optional(p, "payment_proof", "Payment proof reference", 500)?;
            Ok(Some(p.to_string()))
        }
        _ => Ok(None),
    }
}

impl OfferBook {
    pub fn new() -> Self {
        OfferBook { offers: Vec::new(), next_id: 1 }
    }

    pub fn from_records(mut offers: Vec<Offer>) -> Self {
        offers.sort_by_key(|o| o.id);
        let next_id = offers.last().map_or(1, |o| o.id + 1);
        OfferBook { offers, next_id }
    }

    pub fn get(&self, id: i64) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == id)
    }

    fn require(&self, id: i64) -> Result<&Offer, AppError> {
        self.get(id).ok_or_else(|| AppError::not_found("offer", id))
    }

    pub fn list_all(&self) -> &[Offer] {
        &self.offers
    }

    pub fn commit(&mut self, offer: Offer) {
        self.next_id = self.next_id.max(offer.id + 1);
        match self.offers.iter_mut().find(|o| o.id == offer.id) {
            Some(existing) => *existing = offer,
            None => self.offers.push(offer),
        }
    }

    pub fn plan_create(
        &self,
        input: &NewOffer,
        cases: &CaseBook,
        agent: &ActingUser,
        now: DateTime<Utc>,
    ) -> Result<Offer, AppError> {
        let case = cases
            .get(input.case_id)
            .ok_or_else(|| AppError::validation("case_id", format!("Unknown case {}", input.case_id)))?;
        match case.stage() {
            CaseStage::Assigned => {}
            CaseStage::Unassigned => {
                return Err(AppError::Conflict(format!("case {} has not been assigned", case.id)));
            }
            CaseStage::Solved => {
                return Err(AppError::Conflict(format!("case {} is already solved", case.id)));
            }
        }
        if !agent.is_admin() && case.assigned_to() != Some(agent.user_id) {
            log::warn!("user {} tried to make an offer on case {} assigned to {:?}", agent.user_id, case.id, case.assigned_to());
            return Err(AppError::PermissionDenied(format!("case {} is not assigned to you", case.id)));
        }

        let mut offer = Offer::new(
            self.next_id,
            input.case_id,
            input.deal_amount,
            input.advance_paid,
            agent.user_id,
            now,
        )?;
        offer.case_status = input.case_status;
        offer.payment_status = input.payment_status;
        offer.payment_proof = clean_proof(input.payment_proof.as_ref())?;

        if let Some(existing) = self.offers.iter().find(|o| o.case_id == input.case_id) {
            log::warn!("case {} already has offer {}", input.case_id, existing.id);
            return Err(AppError::Conflict(format!(
                "case {} already has offer {}",
                input.case_id, existing.id
            )));
        }
        Ok(offer)
    }

    pub fn create(
        &mut self,
        input: &NewOffer,
        cases: &CaseBook,
        agent: &ActingUser,
        now: DateTime<Utc>,
    ) -> Result<Offer, AppError> {
        let offer = self.plan_create(input, cases, agent, now)?;
        self.commit(offer.clone());
        log::info!("offer {} created for case {} by agent {}", offer.id, offer.case_id, offer.agent_id);
        Ok(offer)
    }

    /// Officers manage their own offers only; admins any.
    fn check_agent(offer: &Offer, actor: &ActingUser) -> Result<(), AppError> {
        if actor.is_admin() || offer.agent_id == actor.user_id {
            return Ok(());
        }
        log::warn!("user {} tried to change offer {} owned by agent {}", actor.user_id, offer.id, offer.agent_id);
        Err(AppError::PermissionDenied(format!("offer {} belongs to another agent", offer.id)))
    }

    /// Apply a patch; the pending balance is re-derived whenever deal or advance change.
    pub fn plan_update(&self, id: i64, patch: &OfferPatch, actor: &ActingUser) -> Result<Offer, AppError> {
        let current = self.require(id)?;
        Self::check_agent(current, actor)?;
        let mut updated = current.clone();

        if patch.deal_amount.is_some() || patch.advance_paid.is_some() {
            let deal = patch.deal_amount.unwrap_or(updated.deal_amount());
            let advance = patch.advance_paid.unwrap_or(updated.advance_paid());
            updated.set_terms(deal, advance)?;
        }
        if let Some(status) = patch.case_status {
            updated.case_status = status;
        }
        if let Some(status) = patch.payment_status {
            updated.payment_status = status;
        }
        if patch.payment_proof.is_some() {
            updated.payment_proof = clean_proof(patch.payment_proof.as_ref())?;
        }
        Ok(updated)
    }

    pub fn update(&mut self, id: i64, patch: &OfferPatch, actor: &ActingUser) -> Result<Offer, AppError> {
        let offer = self.plan_update(id, patch, actor)?;
        self.commit(offer.clone());
        log::info!("offer {id} updated (pending {})", offer.pending_amount());
        Ok(offer)
    }

    /// Checks that `actor` may delete the offer, without removing it.
    pub fn plan_delete(&self, id: i64, actor: &ActingUser) -> Result<&Offer, AppError> {
        let offer = self.require(id)?;
        Self::check_agent(offer, actor)?;
        Ok(offer)
    }

    /// Irreversible. Returns the removed offer.
    pub fn delete(&mut self, id: i64, actor: &ActingUser) -> Result<Offer, AppError> {
        self.plan_delete(id, actor)?;
        let pos = self
            .offers
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| AppError::not_found("offer", id))?;
        let removed = self.offers.remove(pos);
        log::info!("offer {id} deleted");
        Ok(removed)
    }

    pub fn list_by_case(&self, case_id: i64) -> Vec<&Offer> {
        self.offers.iter().filter(|o| o.case_id == case_id).collect()
    }

    pub fn list_by_agent(&self, agent_id: i64) -> Vec<&Offer> {
        self.offers.iter().filter(|o| o.agent_id == agent_id).collect()
    }

    pub fn agent_stats(&self, agent_id: i64) -> AgentOfferStats {
        let offers = self.list_by_agent(agent_id);
        let total_offers = offers.len();
        let total_deal_value = offers.iter().map(|o| o.deal_amount()).sum::<Decimal>();
        let completed = offers
            .iter()
            .filter(|o| o.case_status == OfferCaseStatus::Completed)
            .count();
        let success_rate = match total_offers {
            0 => 0,
            n => ((completed * 100 + n / 2) / n) as u32,
        };
        AgentOfferStats { agent_id, total_offers, total_deal_value, success_rate }
    }
}
