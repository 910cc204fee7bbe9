// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filter::{FilterState, is_visible};
use crate::row::RowStore;
use crate::sort::{SortState, sort_indices};
use crate::views::ViewConfig;

/// Visibility per store index plus the display order of the visible rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewOrder {
    pub visible: Vec<bool>,
    pub order: Vec<usize>,
}

impl ViewOrder {
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Store index shown at display position `position`.
    pub fn row_at(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == index)
    }
}

pub fn render(
    store: &RowStore,
    filter: &FilterState,
    sort: &SortState,
    config: &ViewConfig,
) -> ViewOrder {
    let visible = store
        .rows()
        .iter()
        .map(|row| is_visible(row, filter, config))
        .collect::<Vec<_>>();

    let mut order = visible
        .iter()
        .enumerate()
        .filter_map(|(index, shown)| shown.then_some(index))
        .collect::<Vec<_>>();

    let rule = sort
        .key
        .as_deref()
        .and_then(|key| config.sort_key(key))
        .map(|spec| &spec.rule);
    sort_indices(store, &mut order, rule);

    ViewOrder { visible, order }
}
