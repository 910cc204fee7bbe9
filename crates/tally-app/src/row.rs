// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Row store: the fixed list of rows a view was loaded with.
//!
//! Rows arrive as [`RowSource`]s, the string attributes a renderer attached to
//! each row, and are parsed once into typed [`AttrValue`]s according to the
//! view's declared attributes. Nothing in the controller mutates a [`Row`]
//! after load; a reload replaces the whole store.

use std::collections::{BTreeMap, BTreeSet};

use crate::edit::SubmissionForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Text,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: AttrKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Number { raw: String, parsed: Option<i64> },
}

impl AttrValue {
    fn from_raw(kind: AttrKind, raw: &str) -> Self {
        match kind {
            AttrKind::Text => Self::Text(raw.to_owned()),
            AttrKind::Number => Self::Number {
                raw: raw.to_owned(),
                parsed: parse_integer(raw),
            },
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Text(value) => value,
            Self::Number { raw, .. } => raw,
        }
    }

    pub fn number(&self) -> Option<i64> {
        match self {
            Self::Number { parsed, .. } => *parsed,
            Self::Text(_) => None,
        }
    }
}

/// Base-10 integer with optional sign; surrounding whitespace is ignored.
pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Renderer output for one row: string attributes, the editor controls the
/// row exposes, and the form a save submits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSource {
    pub key: String,
    pub attributes: BTreeMap<String, String>,
    pub editors: BTreeSet<String>,
    pub form: Option<SubmissionForm>,
}

impl RowSource {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_owned(), value.into());
        self
    }

    pub fn editor(mut self, name: &str) -> Self {
        self.editors.insert(name.to_owned());
        self
    }

    pub fn form(mut self, form: SubmissionForm) -> Self {
        self.form = Some(form);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    key: RowKey,
    values: BTreeMap<&'static str, AttrValue>,
    editors: BTreeSet<String>,
    form: Option<SubmissionForm>,
}

impl Row {
    pub fn from_source(source: RowSource, attributes: &[AttrSpec]) -> Self {
        let values = attributes
            .iter()
            .map(|spec| {
                let raw = source
                    .attributes
                    .get(spec.name)
                    .map(String::as_str)
                    .unwrap_or("");
                (spec.name, AttrValue::from_raw(spec.kind, raw))
            })
            .collect();

        Self {
            key: RowKey::new(source.key),
            values,
            editors: source.editors,
            form: source.form,
        }
    }

    pub fn key(&self) -> &RowKey {
        &self.key
    }

    pub fn value(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    /// Raw text of an attribute; unknown attributes read as empty.
    pub fn text(&self, name: &str) -> &str {
        self.value(name).map(AttrValue::raw).unwrap_or("")
    }

    pub fn has_editor(&self, name: &str) -> bool {
        self.editors.contains(name)
    }

    pub fn form(&self) -> Option<&SubmissionForm> {
        self.form.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn load(sources: Vec<RowSource>, attributes: &[AttrSpec]) -> Self {
        Self {
            rows: sources
                .into_iter()
                .map(|source| Row::from_source(source, attributes))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key() == key)
    }
}
