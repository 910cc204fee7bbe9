// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryCategory {
    Add,
    Remove,
}

impl EntryCategory {
    pub const ALL: [Self; 2] = [Self::Add, Self::Remove];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }

    /// Category implied by the sign of a stored amount.
    pub const fn for_amount(amount: i64) -> Self {
        if amount > 0 { Self::Add } else { Self::Remove }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: RecordId,
    pub account: String,
    pub time: OffsetDateTime,
    pub category: EntryCategory,
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub account: String,
    pub name: String,
    pub points: i64,
    pub record_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    pub account: String,
    pub time: OffsetDateTime,
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    Entries,
    Users,
    Logs,
}

impl ViewKind {
    pub const ALL: [Self; 3] = [Self::Entries, Self::Users, Self::Logs];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Entries => "Entries",
            Self::Users => "Users",
            Self::Logs => "Logs",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entries => "entries",
            Self::Users => "users",
            Self::Logs => "logs",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "entries" => Some(Self::Entries),
            "users" => Some(Self::Users),
            "logs" => Some(Self::Logs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Query,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}
