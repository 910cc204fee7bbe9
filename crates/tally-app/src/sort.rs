// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::SortDirection;
use crate::row::{Row, RowStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortRule {
    Lexical {
        attr: &'static str,
        direction: SortDirection,
    },
    Numeric {
        attr: &'static str,
        direction: SortDirection,
    },
    /// Rows whose `attr` equals `value` go to `placement`; the rest keep
    /// store order relative to each other.
    Priority {
        attr: &'static str,
        value: &'static str,
        placement: Placement,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKeySpec {
    pub id: &'static str,
    pub label: &'static str,
    pub rule: SortRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: Option<String>,
}

impl SortState {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }
}

impl SortRule {
    /// Orders two rows by this rule alone. Rows with an unparseable numeric
    /// attribute compare greater than any parseable one, whatever the
    /// direction.
    pub fn compare(&self, left: &Row, right: &Row) -> Ordering {
        match *self {
            Self::Lexical { attr, direction } => {
                directed(collate(left.text(attr), right.text(attr)), direction)
            }
            Self::Numeric { attr, direction } => {
                let left = left.value(attr).and_then(|value| value.number());
                let right = right.value(attr).and_then(|value| value.number());
                match (left, right) {
                    (Some(left), Some(right)) => directed(left.cmp(&right), direction),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            Self::Priority {
                attr,
                value,
                placement,
            } => {
                let left_hit = left.text(attr) == value;
                let right_hit = right.text(attr) == value;
                match placement {
                    Placement::First => right_hit.cmp(&left_hit),
                    Placement::Last => left_hit.cmp(&right_hit),
                }
            }
        }
    }

    fn reverses_ties(&self, left: &Row, right: &Row) -> bool {
        match *self {
            Self::Lexical { direction, .. } => direction == SortDirection::Desc,
            Self::Numeric { attr, direction } => {
                direction == SortDirection::Desc
                    && left.value(attr).and_then(|value| value.number()).is_some()
                    && right.value(attr).and_then(|value| value.number()).is_some()
            }
            Self::Priority { .. } => false,
        }
    }
}

/// Sorts `indices` (positions in `store`) in place. Ties fall back to store
/// order, reversed for descending keys so that flipping the direction
/// mirrors the whole sequence.
pub fn sort_indices(store: &RowStore, indices: &mut [usize], rule: Option<&SortRule>) {
    let Some(rule) = rule else {
        indices.sort_unstable();
        return;
    };

    indices.sort_by(|&left_index, &right_index| {
        let (Some(left), Some(right)) = (store.get(left_index), store.get(right_index)) else {
            return left_index.cmp(&right_index);
        };
        rule.compare(left, right).then_with(|| {
            if rule.reverses_ties(left, right) {
                right_index.cmp(&left_index)
            } else {
                left_index.cmp(&right_index)
            }
        })
    });
}

/// Case-insensitive ordering with a case-sensitive tiebreak so distinct
/// strings never compare equal.
pub fn collate(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

fn directed(order: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => order,
        SortDirection::Desc => order.reverse(),
    }
}
