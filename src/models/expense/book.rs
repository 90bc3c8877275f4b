use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::types::*;
use crate::auth::ActingUser;
use crate::auth::validate::{
    validate_non_negative_amount, validate_optional, validate_positive_amount, validate_required,
};
use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct ExpenseBook {
    expenses: Vec<Expense>,
    next_id: i64,
}

impl Default for ExpenseBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseBook {
    pub fn new() -> Self {
        ExpenseBook { expenses: Vec::new(), next_id: 1 }
    }

    pub fn from_records(mut expenses: Vec<Expense>) -> Self {
        expenses.sort_by_key(|e| e.id);
        let next_id = expenses.last().map_or(1, |e| e.id + 1);
        ExpenseBook { expenses, next_id }
    }

    pub fn get(&self, id: i64) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn list_all(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn list_by_user(&self, user_id: i64) -> Vec<&Expense> {
        self.expenses.iter().filter(|e| e.user_id == user_id).collect()
    }

    pub fn commit(&mut self, expense: Expense) {
        self.next_id = self.next_id.max(expense.id + 1);
        match self.expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense,
            None => self.expenses.push(expense),
        }
    }

    pub fn plan_record(&self, input: &NewExpense, owner: &ActingUser, now: DateTime<Utc>) -> Result<Expense, AppError> {
        let date = input
            .date
            .ok_or_else(|| AppError::validation("date", "Date is required"))?;
        let amount = input
            .amount
            .ok_or_else(|| AppError::validation("amount", "Amount is required"))?;
        validate_positive_amount(amount, "amount", "Amount")?;
        validate_required(&input.expense_type, "expense_type", "Expense type", 100)?;
        let advance = input.advance.unwrap_or(Decimal::ZERO);
        validate_non_negative_amount(advance, "advance", "Advance")?;
        validate_optional(&input.description, "description", "Description", 1000)?;

        Ok(Expense {
            id: self.next_id,
            date,
            amount,
            expense_type: input.expense_type.trim().to_string(),
            advance,
            description: input.description.trim().to_string(),
            user_id: owner.user_id,
            created_at: now,
        })
    }

    pub fn record(&mut self, input: &NewExpense, owner: &ActingUser, now: DateTime<Utc>) -> Result<Expense, AppError> {
        let expense = self.plan_record(input, owner, now)?;
        self.commit(expense.clone());
        log::info!("expense {} recorded by user {} ({})", expense.id, expense.user_id, expense.amount);
        Ok(expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::NaiveDate;

    fn form() -> NewExpense {
        NewExpense {
            date: NaiveDate::from_ymd_opt(2024, 3, 4),
            amount: Some(Decimal::new(150050, 2)),
            expense_type: "Travel".into(),
            advance: None,
            description: "Field visit to Nadiad".into(),
        }
    }

    #[test]
    fn advance_defaults_to_zero() {
        let mut book = ExpenseBook::new();
        let owner = ActingUser::new(4, Role::Marketing);
        let e = book.record(&form(), &owner, Utc::now()).unwrap();
        assert_eq!(e.advance, Decimal::ZERO);
        assert_eq!(e.user_id, 4);
        assert_eq!(book.list_by_user(4).len(), 1);
        assert!(book.list_by_user(5).is_empty());
    }

    #[test]
    fn date_amount_and_type_are_mandatory() {
        let book = ExpenseBook::new();
        let owner = ActingUser::new(4, Role::Marketing);
        let now = Utc::now();

        let missing_date = NewExpense { date: None, ..form() };
        assert_eq!(book.plan_record(&missing_date, &owner, now).unwrap_err().field(), Some("date"));
        let missing_amount = NewExpense { amount: None, ..form() };
        assert_eq!(book.plan_record(&missing_amount, &owner, now).unwrap_err().field(), Some("amount"));
        let blank_type = NewExpense { expense_type: " ".into(), ..form() };
        assert_eq!(
            book.plan_record(&blank_type, &owner, now).unwrap_err().field(),
            Some("expense_type")
        );
        let negative = NewExpense { amount: Some(Decimal::new(-5, 0)), ..form() };
        assert_eq!(book.plan_record(&negative, &owner, now).unwrap_err().field(), Some("amount"));
    }
}
