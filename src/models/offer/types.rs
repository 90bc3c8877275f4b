use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::validate::{validate_non_negative_amount, validate_positive_amount};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Complete,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [PaymentStatus::Pending, PaymentStatus::Partial, PaymentStatus::Complete];

    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Complete => "Complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Officer's view of the case the offer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OfferCaseStatus {
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl OfferCaseStatus {
    pub const ALL: [OfferCaseStatus; 3] = [
        OfferCaseStatus::InProgress,
        OfferCaseStatus::Completed,
        OfferCaseStatus::OnHold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OfferCaseStatus::InProgress => "In Progress",
            OfferCaseStatus::Completed => "Completed",
            OfferCaseStatus::OnHold => "On Hold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.label().eq_ignore_ascii_case(s.trim()))
    }
}

/// Financial terms attached to a case.
///
/// The three amounts are private so `pending_amount = deal_amount - advance_paid`
/// can only change through [`Offer::set_terms`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    pub id: i64,
    pub case_id: i64,
    deal_amount: Decimal,
    advance_paid: Decimal,
    pending_amount: Decimal,
    pub case_status: OfferCaseStatus,
    pub payment_status: PaymentStatus,
    /// Reference into the blob store, never the file itself.
    pub payment_proof: Option<String>,
    pub agent_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Build an offer with validated terms and default statuses.
    pub fn new(
        id: i64,
        case_id: i64,
        deal_amount: Decimal,
        advance_paid: Decimal,
        agent_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        let mut offer = Offer {
            id,
            case_id,
            deal_amount: Decimal::ZERO,
            advance_paid: Decimal::ZERO,
            pending_amount: Decimal::ZERO,
            case_status: OfferCaseStatus::default(),
            payment_status: PaymentStatus::default(),
            payment_proof: None,
            agent_id,
            created_at,
        };
        offer.set_terms(deal_amount, advance_paid)?;
        Ok(offer)
    }

    pub fn deal_amount(&self) -> Decimal {
        self.deal_amount
    }

    pub fn advance_paid(&self) -> Decimal {
        self.advance_paid
    }

    pub fn pending_amount(&self) -> Decimal {
        self.pending_amount
    }

    /// Replace deal and advance together and re-derive the pending balance.
    /// On error the offer is untouched.
    pub fn set_terms(&mut self, deal_amount: Decimal, advance_paid: Decimal) -> Result<(), AppError> {
        validate_positive_amount(deal_amount, "deal_amount", "Deal amount")?;
        validate_non_negative_amount(advance_paid, "advance_paid", "Advance paid")?;
        if advance_paid > deal_amount {
            return Err(AppError::validation(
                "advance_paid",
                format!("Advance paid ({advance_paid}) cannot exceed the deal amount ({deal_amount})"),
            ));
        }
        self.deal_amount = deal_amount;
        self.advance_paid = advance_paid;
        self.pending_amount = deal_amount - advance_paid;
        Ok(())
    }

    /// Cash actually received: the full deal once paid in full, the advance otherwise.
    pub fn collected_amount(&self) -> Decimal {
        match self.payment_status {
            PaymentStatus::Complete => self.deal_amount,
            PaymentStatus::Pending | PaymentStatus::Partial => self.advance_paid,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOffer {
    pub case_id: i64,
    pub deal_amount: Decimal,
    #[serde(default)]
    pub advance_paid: Decimal,
    #[serde(default)]
    pub case_status: OfferCaseStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_proof: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfferPatch {
    pub deal_amount: Option<Decimal>,
    pub advance_paid: Option<Decimal>,
    pub case_status: Option<OfferCaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_proof: Option<String>,
}

/// Per-agent performance summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOfferStats {
    pub agent_id: i64,
    pub total_offers: usize,
    pub total_deal_value: Decimal,
    /// Percentage of offers whose case status is Completed, rounded to a whole number.
    pub success_rate: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn pending_is_derived_from_terms() {
        let offer = Offer::new(1, 1, dec(25000), dec(10000), 2, Utc::now()).unwrap();
        assert_eq!(offer.pending_amount(), dec(15000));
    }

    #[test]
    fn rejected_terms_leave_offer_unchanged() {
        let mut offer = Offer::new(1, 1, dec(25000), dec(10000), 2, Utc::now()).unwrap();
        let err = offer.set_terms(dec(25000), dec(30000)).unwrap_err();
        assert_eq!(err.field(), Some("advance_paid"));
        assert_eq!(offer.advance_paid(), dec(10000));
        assert_eq!(offer.pending_amount(), dec(15000));

        assert_eq!(offer.set_terms(Decimal::ZERO, Decimal::ZERO).unwrap_err().field(), Some("deal_amount"));
    }

    #[test]
    fn collected_amount_follows_payment_status() {
        let mut offer = Offer::new(1, 1, dec(20000), dec(5000), 2, Utc::now()).unwrap();
        assert_eq!(offer.collected_amount(), dec(5000));
        offer.payment_status = PaymentStatus::Complete;
        assert_eq!(offer.collected_amount(), dec(20000));
    }
}
