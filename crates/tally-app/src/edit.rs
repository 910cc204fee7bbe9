// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-row inline editing.
//!
//! A row is either [`EditState::Viewing`] or [`EditState::Editing`] with its
//! own [`EditDraft`]. Saving copies the draft into the row's
//! [`SubmissionForm`] and hands the form to a [`FormSubmitter`]; the caller
//! is expected to reload the rows afterwards, so saving does not move the
//! row back to `Viewing`.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    Raw,
    OneOf {
        allowed: &'static [&'static str],
        fallback: &'static str,
    },
}

impl Normalize {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Raw => value.to_owned(),
            Self::OneOf { allowed, fallback } => {
                if allowed.contains(&value) {
                    value.to_owned()
                } else {
                    fallback.to_owned()
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditableField {
    pub attr: &'static str,
    pub payload: &'static str,
    pub normalize: Normalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSpec {
    pub fields: &'static [EditableField],
}

/// Removal hook: a form posted to `action` carrying the `keys` fields of the
/// row's rendered form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSpec {
    pub action: &'static str,
    pub keys: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionForm {
    action: String,
    fields: BTreeMap<String, String>,
}

impl SubmissionForm {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn overwrite(&mut self, name: &str, value: String) {
        if let Some(slot) = self.fields.get_mut(name) {
            *slot = value;
        }
    }
}

/// Candidate values for the editable attributes whose controls exist on the
/// row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    values: BTreeMap<&'static str, String>,
}

impl EditDraft {
    pub fn from_row(row: &Row, spec: &EditSpec) -> Self {
        let values = spec
            .fields
            .iter()
            .filter(|field| row.has_editor(field.attr))
            .map(|field| (field.attr, row.text(field.attr).to_owned()))
            .collect();
        Self { values }
    }

    pub fn get(&self, attr: &str) -> Option<&str> {
        self.values.get(attr).map(String::as_str)
    }

    /// Returns false when the row has no control for `attr`.
    pub fn set(&mut self, attr: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(attr) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Viewing,
    Editing(EditDraft),
}

impl EditState {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        match self {
            Self::Editing(draft) => Some(draft),
            Self::Viewing => None,
        }
    }
}

/// Accepts a saved row's form; the server-side endpoint in production.
pub trait FormSubmitter {
    fn submit(&mut self, form: &SubmissionForm) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    NotEditing,
    NoForm,
    Submitted { payload_written: bool },
}

/// Copies the draft into a clone of the row's form. The payload is written
/// only when every editable field has both a draft value and a slot in the
/// form; otherwise the form is returned untouched.
pub fn fill_form(row: &Row, draft: &EditDraft, spec: &EditSpec) -> Option<(SubmissionForm, bool)> {
    let mut form = row.form()?.clone();

    let complete = spec
        .fields
        .iter()
        .all(|field| draft.get(field.attr).is_some() && form.has_field(field.payload));
    if !complete {
        return Some((form, false));
    }

    for field in spec.fields {
        if let Some(value) = draft.get(field.attr) {
            form.overwrite(field.payload, field.normalize.apply(value));
        }
    }
    Some((form, true))
}

/// Builds the removal form for `row`. None when the row has no form or its
/// form lacks one of the identifying fields.
pub fn delete_form(row: &Row, spec: &DeleteSpec) -> Option<SubmissionForm> {
    let rendered = row.form()?;
    let mut form = SubmissionForm::new(spec.action);
    for key in spec.keys {
        form = form.field(key, rendered.value(key)?);
    }
    Some(form)
}
