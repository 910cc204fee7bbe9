// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

pub const ACCOUNT_LENGTH: usize = 9;
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 64;
pub const PASSWORD_MIN_CHARS: usize = 4;
pub const PASSWORD_MAX_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Account,
    Name,
    Password,
    Confirm,
}

impl FormField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Name => "name",
            Self::Password => "password",
            Self::Confirm => "confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    NotDigits,
    WrongLength { expected: usize },
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidCharacters,
    Mismatch,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::NotDigits => f.write_str("may only contain digits"),
            Self::WrongLength { expected } => write!(f, "must be exactly {expected} characters"),
            Self::TooShort { min } => write!(f, "must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
            Self::InvalidCharacters => {
                f.write_str("may only contain letters, digits, '-' and '_'")
            }
            Self::Mismatch => f.write_str("does not match the password"),
        }
    }
}

/// Every failing field of one form, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors {
    errors: Vec<(FormField, FieldError)>,
}

impl FieldErrors {
    fn collect(checks: impl IntoIterator<Item = (FormField, Result<(), FieldError>)>) -> Self {
        Self {
            errors: checks
                .into_iter()
                .filter_map(|(field, result)| result.err().map(|error| (field, error)))
                .collect(),
        }
    }

    fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field that should receive focus: the first one that failed.
    pub fn focus(&self) -> Option<FormField> {
        self.errors.first().map(|(field, _)| *field)
    }

    pub fn get(&self, field: FormField) -> Option<FieldError> {
        self.errors
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, error)| *error)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, FieldError)> + '_ {
        self.errors.iter().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, error)) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {error}", field.as_str())?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

pub fn validate_account(raw: &str) -> Result<(), FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FieldError::Required);
    }
    if !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(FieldError::NotDigits);
    }
    if value.len() != ACCOUNT_LENGTH {
        return Err(FieldError::WrongLength {
            expected: ACCOUNT_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_name(raw: &str) -> Result<(), FieldError> {
    let value = raw.trim();
    let chars = value.chars().count();
    if chars == 0 {
        return Err(FieldError::Required);
    }
    if chars < NAME_MIN_CHARS {
        return Err(FieldError::TooShort {
            min: NAME_MIN_CHARS,
        });
    }
    if chars > NAME_MAX_CHARS {
        return Err(FieldError::TooLong {
            max: NAME_MAX_CHARS,
        });
    }
    Ok(())
}

pub fn validate_password(raw: &str) -> Result<(), FieldError> {
    if raw.is_empty() {
        return Err(FieldError::Required);
    }
    if !raw
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(FieldError::InvalidCharacters);
    }
    let chars = raw.chars().count();
    if chars < PASSWORD_MIN_CHARS {
        return Err(FieldError::TooShort {
            min: PASSWORD_MIN_CHARS,
        });
    }
    if chars > PASSWORD_MAX_CHARS {
        return Err(FieldError::TooLong {
            max: PASSWORD_MAX_CHARS,
        });
    }
    Ok(())
}

pub fn validate_confirm(password: &str, confirm: &str) -> Result<(), FieldError> {
    if confirm.is_empty() {
        return Err(FieldError::Required);
    }
    if confirm != password {
        return Err(FieldError::Mismatch);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationInput {
    pub account: String,
    pub name: String,
    pub password: String,
    pub confirm: String,
}

impl RegistrationInput {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        FieldErrors::collect([
            (FormField::Account, validate_account(&self.account)),
            (FormField::Name, validate_name(&self.name)),
            (FormField::Password, validate_password(&self.password)),
            (
                FormField::Confirm,
                validate_confirm(&self.password, &self.confirm),
            ),
        ])
        .into_result()
    }
}
