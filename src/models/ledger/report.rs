use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::filter::{EntryKind, LedgerFilter};
use crate::models::calendar::calendar_date;
use crate::models::case::CaseBook;
use crate::models::expense::Expense;
use crate::models::offer::Offer;

/// Status shown on expense rows; expenses have no payment lifecycle.
pub const EXPENSE_STATUS: &str = "Completed";

/// One row of the combined revenue/expense ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    /// Offer id for revenue rows, expense id for expense rows.
    pub id: i64,
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub name: String,
    pub description: String,
    pub status: String,
    pub amount: Decimal,
    /// Cash received so far; revenue rows only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected: Option<Decimal>,
}

impl LedgerEntry {
    pub fn from_offer(offer: &Offer, cases: &CaseBook, tz: &FixedOffset) -> Self {
        let (name, description) = match cases.get(offer.case_id) {
            Some(case) => (case.customer_name.clone(), case.problem.clone()),
            None => (format!("Case {}", offer.case_id), String::new()),
        };
        LedgerEntry {
            id: offer.id,
            kind: EntryKind::Revenue,
            date: calendar_date(offer.created_at, tz),
            name,
            description,
            status: offer.payment_status.label().to_string(),
            amount: offer.deal_amount(),
            collected: Some(offer.collected_amount()),
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        LedgerEntry {
            id: expense.id,
            kind: EntryKind::Expense,
            date: expense.date,
            name: expense.expense_type.clone(),
            description: expense.description.clone(),
            status: EXPENSE_STATUS.to_string(),
            amount: expense.amount,
            collected: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LedgerTotals {
    /// Booked revenue: every offer's deal amount, whatever its payment status.
    pub total_revenue: Decimal,
    pub total_expense: Decimal,
    pub net_profit: Decimal,
    /// Cash basis: deal for fully paid offers, advance otherwise.
    pub collected_revenue: Decimal,
}

impl LedgerTotals {
    pub fn aggregate<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        let mut totals = LedgerTotals::default();
        for entry in entries {
            match entry.kind {
                EntryKind::Revenue => {
                    totals.total_revenue += entry.amount;
                    totals.collected_revenue += entry.collected.unwrap_or(Decimal::ZERO);
                }
                EntryKind::Expense => totals.total_expense += entry.amount,
            }
        }
        totals.net_profit = totals.total_revenue - totals.total_expense;
        totals
    }
}

/// Unfiltered and filtered totals side by side, plus the filtered rows.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerReport {
    pub overall: LedgerTotals,
    pub filtered: LedgerTotals,
    pub entries: Vec<LedgerEntry>,
}

impl LedgerReport {
    /// Recomputed from scratch on every call.
    pub fn build(
        offers: &[Offer],
        expenses: &[Expense],
        cases: &CaseBook,
        filter: &LedgerFilter,
        tz: &FixedOffset,
    ) -> Self {
        let all: Vec<LedgerEntry> = offers
            .iter()
            .map(|o| LedgerEntry::from_offer(o, cases, tz))
            .chain(expenses.iter().map(LedgerEntry::from_expense))
            .collect();

        let overall = LedgerTotals::aggregate(&all);
        let mut entries: Vec<LedgerEntry> = all.into_iter().filter(|e| filter.matches(e)).collect();
        let filtered = LedgerTotals::aggregate(&entries);
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        LedgerReport { overall, filtered, entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ActingUser, Role};
    use crate::models::case::NewCase;
    use crate::models::expense::{ExpenseBook, NewExpense};
    use crate::models::ledger::KindFilter;
    use crate::models::offer::{NewOffer, OfferBook, OfferCaseStatus, PaymentStatus};
    use chrono::{DateTime, Utc};

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    struct Books {
        cases: CaseBook,
        offers: OfferBook,
        expenses: ExpenseBook,
    }

    fn books() -> Books {
        let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);
        let officer = ActingUser::new(2, Role::Officer);
        let marketing = ActingUser::new(3, Role::Marketing);
        let mut cases = CaseBook::new();
        let mut offers = OfferBook::new();
        let mut expenses = ExpenseBook::new();

        for (i, (name, deal, advance, paid, day)) in [
            ("Ritu Desai", 25000, 10000, PaymentStatus::Partial, "2024-03-01T10:00:00Z"),
            ("Manoj Iyer", 40000, 0, PaymentStatus::Pending, "2024-03-05T10:00:00Z"),
            ("Farah Khan", 12000, 12000, PaymentStatus::Complete, "2024-03-09T10:00:00Z"),
        ]
        .into_iter()
        .enumerate()
        {
            let case = cases
                .intake(
                    &NewCase {
                        customer_name: name.into(),
                        phone: format!("90000000{i:02}"),
                        problem: "Loan settlement".into(),
                        bank: "Axis".into(),
                        loan_type: "Personal".into(),
                        ..Default::default()
                    },
                    None,
                    at(day),
                )
                .unwrap();
            offers
                .create(
                    &NewOffer {
                        case_id: case.id,
                        deal_amount: dec(deal),
                        advance_paid: dec(advance),
                        case_status: OfferCaseStatus::InProgress,
                        payment_status: paid,
                        payment_proof: None,
                    },
                    &cases,
                    &officer,
                    at(day),
                )
                .unwrap();
        }
        for (day, amount, kind) in [(2, 3000, "Travel"), (6, 4500, "Printing")] {
            expenses
                .record(
                    &NewExpense {
                        date: NaiveDate::from_ymd_opt(2024, 3, day),
                        amount: Some(dec(amount)),
                        expense_type: kind.into(),
                        advance: None,
                        description: format!("{kind} for March drive"),
                    },
                    &marketing,
                    at("2024-03-10T10:00:00Z"),
                )
                .unwrap();
        }
        Books { cases, offers, expenses }
    }

    fn report(b: &Books, filter: &LedgerFilter) -> LedgerReport {
        LedgerReport::build(b.offers.list_all(), b.expenses.list_all(), &b.cases, filter, &utc())
    }

    #[test]
    fn overall_totals_book_every_deal() {
        let b = books();
        let r = report(&b, &LedgerFilter::default());
        assert_eq!(r.overall.total_revenue, dec(77000));
        assert_eq!(r.overall.total_expense, dec(7500));
        assert_eq!(r.overall.net_profit, dec(69500));
        assert_eq!(r.overall.collected_revenue, dec(22000));
        assert_eq!(r.filtered, r.overall);
        assert_eq!(r.entries.len(), 5);
        assert_eq!(r.entries[0].date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn disjoint_date_partitions_sum_to_the_whole() {
        let b = books();
        let overall = report(&b, &LedgerFilter::default()).overall;
        let split = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let early = report(&b, &LedgerFilter { to: Some(split), ..Default::default() }).filtered;
        let late = report(
            &b,
            &LedgerFilter { from: split.succ_opt(), ..Default::default() },
        )
        .filtered;

        assert_eq!(early.total_revenue + late.total_revenue, overall.total_revenue);
        assert_eq!(early.total_expense + late.total_expense, overall.total_expense);
        assert_eq!(early.net_profit + late.net_profit, overall.net_profit);
    }

    #[test]
    fn filters_are_conjunctive() {
        let b = books();
        let filter = LedgerFilter {
            kind: KindFilter::Revenue,
            status: Some("pending".into()),
            search: Some("manoj".into()),
            ..Default::default()
        };
        let r = report(&b, &filter);
        assert_eq!(r.entries.len(), 1);
        assert_eq!(r.filtered.total_revenue, dec(40000));
        assert_eq!(r.filtered.total_expense, Decimal::ZERO);

        let nothing = LedgerFilter { kind: KindFilter::Expense, search: Some("manoj".into()), ..Default::default() };
        assert!(report(&b, &nothing).entries.is_empty());
    }

    #[test]
    fn expense_rows_report_completed() {
        let b = books();
        let filter = LedgerFilter { status: Some("Completed".into()), ..Default::default() };
        let r = report(&b, &filter);
        assert!(r.entries.iter().all(|e| e.kind == EntryKind::Expense));
        assert_eq!(r.filtered.total_expense, dec(7500));
    }
}
