// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::row::Row;
use crate::views::ViewConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub category: Option<String>,
    pub query: Option<String>,
}

impl FilterState {
    /// Builds a filter from raw control values. Blank selections mean "no
    /// clause"; the query is trimmed and lowercased.
    pub fn from_controls(category: Option<&str>, query: &str) -> Self {
        let category = category
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        let query = query.trim();
        let query = (!query.is_empty()).then(|| query.to_lowercase());
        Self { category, query }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.query.is_none()
    }
}

pub fn is_visible(row: &Row, filter: &FilterState, config: &ViewConfig) -> bool {
    category_matches(row, filter, config) && text_matches(row, filter, config)
}

fn category_matches(row: &Row, filter: &FilterState, config: &ViewConfig) -> bool {
    let Some(wanted) = &filter.category else {
        return true;
    };
    match config.category_attr {
        Some(attr) => row.text(attr) == wanted,
        None => true,
    }
}

fn text_matches(row: &Row, filter: &FilterState, config: &ViewConfig) -> bool {
    let Some(query) = &filter.query else {
        return true;
    };
    search_haystack(row, config).contains(query.as_str())
}

fn search_haystack(row: &Row, config: &ViewConfig) -> String {
    config
        .searchable
        .iter()
        .map(|attr| row.text(attr))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
