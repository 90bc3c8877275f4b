use rust_decimal::Decimal;

use crate::errors::AppError;

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field: &'static str, label: &str, max_len: usize) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(field, format!("{label} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation(field, format!("{label} must be at most {max_len} characters")));
    }
    Ok(())
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field: &'static str, label: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().chars().count() > max_len {
        return Err(AppError::validation(field, format!("{label} must be at most {max_len} characters")));
    }
    Ok(())
}

/// Validate a username: 2-50 chars, alphanumeric and underscore only.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    let trimmed = username.trim();
    validate_required(trimmed, "username", "Username", 50)?;
    if trimmed.len() < 2 {
        return Err(AppError::validation("username", "Username must be at least 2 characters"));
    }
    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(AppError::validation(
            "username",
            "Username may only contain letters, numbers, and underscores",
        ));
    }
    Ok(())
}

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let trimmed = email.trim();
    validate_required(trimmed, "email", "Email", 254)?;
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.ends_with('.') => Ok(()),
        _ => Err(AppError::validation("email", "Email must be a valid address (contain '@' and '.')")),
    }
}

/// Validate a customer phone number: exactly 10 digits.
pub fn validate_customer_phone(phone: &str) -> Result<(), AppError> {
    let trimmed = phone.trim();
    validate_required(trimmed, "phone", "Phone", 20)?;
    if trimmed.len() != 10 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation("phone", "Phone must be 10 digits"));
    }
    Ok(())
}

/// Money columns are NUMERIC(14,2).
const MONEY_SCALE: u32 = 2;

/// Twelve integer digits.
fn money_limit() -> Decimal {
    Decimal::new(1_000_000_000_000, 0)
}

/// Amounts must fit the money columns exactly, or the stored value would differ.
fn validate_money_precision(amount: Decimal, field: &'static str, label: &str) -> Result<(), AppError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::validation(
            field,
            format!("{label} may have at most {MONEY_SCALE} decimal places"),
        ));
    }
    let limit = money_limit();
    if amount.abs() >= limit {
        return Err(AppError::validation(field, format!("{label} must be below {limit}")));
    }
    Ok(())
}

/// Validate a money amount that must be strictly positive.
pub fn validate_positive_amount(amount: Decimal, field: &'static str, label: &str) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::validation(field, format!("{label} must be greater than zero")));
    }
    validate_money_precision(amount, field, label)
}

/// Validate a money amount that may be zero but never negative.
pub fn validate_non_negative_amount(amount: Decimal, field: &'static str, label: &str) -> Result<(), AppError> {
    if amount < Decimal::ZERO {
        return Err(AppError::validation(field, format!("{label} cannot be negative")));
    }
    validate_money_precision(amount, field, label)
}
