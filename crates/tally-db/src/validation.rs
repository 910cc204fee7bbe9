// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tally_app::EntryCategory;

pub const MIN_POINT_UPDATE: i64 = -100;
pub const MAX_POINT_UPDATE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidInt,
    ZeroAmount,
    InvalidCategory,
    EmptyReason,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInt => f.write_str("invalid integer value"),
            Self::ZeroAmount => f.write_str("amount must not be zero"),
            Self::InvalidCategory => f.write_str("type must be add or remove"),
            Self::EmptyReason => f.write_str("reason is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

pub fn parse_required_int(input: &str) -> ValidationResult<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidInt)
}

pub fn parse_category(input: &str) -> ValidationResult<EntryCategory> {
    EntryCategory::parse(input.trim()).ok_or(ValidationError::InvalidCategory)
}

pub fn parse_reason(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyReason);
    }
    Ok(trimmed.to_owned())
}

/// Forces the sign of `amount` to agree with `category`.
pub fn normalize_signed_amount(category: EntryCategory, amount: i64) -> i64 {
    match category {
        EntryCategory::Add => amount.saturating_abs(),
        EntryCategory::Remove if amount > 0 => -amount,
        EntryCategory::Remove => amount,
    }
}

pub fn clamp_amount(amount: i64) -> i64 {
    amount.clamp(MIN_POINT_UPDATE, MAX_POINT_UPDATE)
}

/// New adjustments must move points; record updates may set zero.
pub fn require_nonzero(amount: i64) -> ValidationResult<i64> {
    if amount == 0 {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(amount)
}

/// Parses, sign-normalizes and clamps a submitted amount.
pub fn resolve_amount(category: EntryCategory, input: &str) -> ValidationResult<i64> {
    let amount = parse_required_int(input)?;
    Ok(clamp_amount(normalize_signed_amount(category, amount)))
}
