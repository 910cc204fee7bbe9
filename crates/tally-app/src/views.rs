// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The concrete table configurations and the renderers that turn domain
//! rows into [`RowSource`]s for them.

use crate::edit::{DeleteSpec, EditSpec, EditableField, Normalize, SubmissionForm};
use crate::row::{AttrKind, AttrSpec, RowSource};
use crate::sort::{Placement, SortKeySpec, SortRule};
use crate::timestamp::to_rfc3339;
use crate::{Entry, LogEntry, SortDirection, UserSummary, ViewKind};

pub const RECORD_UPDATE_ACTION: &str = "/admin/record/update";
pub const RECORD_DELETE_ACTION: &str = "/admin/record/delete";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewControls {
    pub category: bool,
    pub query: bool,
    pub sort: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub kind: ViewKind,
    pub attributes: &'static [AttrSpec],
    pub category_attr: Option<&'static str>,
    pub category_choices: &'static [&'static str],
    pub searchable: &'static [&'static str],
    pub sort_keys: &'static [SortKeySpec],
    pub default_sort: &'static str,
    pub controls: ViewControls,
    pub edit: Option<EditSpec>,
    pub delete: Option<DeleteSpec>,
    /// Attribute rendered through the timestamp localizer for display.
    pub timestamp_attr: Option<&'static str>,
}

impl ViewConfig {
    pub fn for_kind(kind: ViewKind) -> &'static Self {
        match kind {
            ViewKind::Entries => &ENTRIES,
            ViewKind::Users => &USERS,
            ViewKind::Logs => &LOGS,
        }
    }

    pub fn sort_key(&self, id: &str) -> Option<&'static SortKeySpec> {
        self.sort_keys.iter().find(|spec| spec.id == id)
    }
}

const ENTRY_ATTRIBUTES: [AttrSpec; 4] = [
    AttrSpec {
        name: "time",
        label: "Time",
        kind: AttrKind::Text,
    },
    AttrSpec {
        name: "category",
        label: "Type",
        kind: AttrKind::Text,
    },
    AttrSpec {
        name: "amount",
        label: "Amount",
        kind: AttrKind::Number,
    },
    AttrSpec {
        name: "reason",
        label: "Reason",
        kind: AttrKind::Text,
    },
];

const ENTRY_SORT_KEYS: [SortKeySpec; 6] = [
    SortKeySpec {
        id: "time_asc",
        label: "time asc",
        rule: SortRule::Lexical {
            attr: "time",
            direction: SortDirection::Asc,
        },
    },
    SortKeySpec {
        id: "time_desc",
        label: "time desc",
        rule: SortRule::Lexical {
            attr: "time",
            direction: SortDirection::Desc,
        },
    },
    SortKeySpec {
        id: "amount_asc",
        label: "amount asc",
        rule: SortRule::Numeric {
            attr: "amount",
            direction: SortDirection::Asc,
        },
    },
    SortKeySpec {
        id: "amount_desc",
        label: "amount desc",
        rule: SortRule::Numeric {
            attr: "amount",
            direction: SortDirection::Desc,
        },
    },
    SortKeySpec {
        id: "type_add_first",
        label: "adds first",
        rule: SortRule::Priority {
            attr: "category",
            value: "add",
            placement: Placement::First,
        },
    },
    SortKeySpec {
        id: "type_remove_first",
        label: "removes first",
        rule: SortRule::Priority {
            attr: "category",
            value: "add",
            placement: Placement::Last,
        },
    },
];

const ENTRY_EDIT_FIELDS: [EditableField; 3] = [
    EditableField {
        attr: "category",
        payload: "category",
        normalize: Normalize::OneOf {
            allowed: &["add", "remove"],
            fallback: "add",
        },
    },
    EditableField {
        attr: "amount",
        payload: "amount",
        normalize: Normalize::Raw,
    },
    EditableField {
        attr: "reason",
        payload: "reason",
        normalize: Normalize::Raw,
    },
];

pub static ENTRIES: ViewConfig = ViewConfig {
    kind: ViewKind::Entries,
    attributes: &ENTRY_ATTRIBUTES,
    category_attr: Some("category"),
    category_choices: &["add", "remove"],
    searchable: &["time", "reason"],
    sort_keys: &ENTRY_SORT_KEYS,
    default_sort: "time_desc",
    controls: ViewControls {
        category: true,
        query: true,
        sort: true,
    },
    edit: Some(EditSpec {
        fields: &ENTRY_EDIT_FIELDS,
    }),
    delete: Some(DeleteSpec {
        action: RECORD_DELETE_ACTION,
        keys: &["account", "id"],
    }),
    timestamp_attr: Some("time"),
};

const USER_ATTRIBUTES: [AttrSpec; 3] = [
    AttrSpec {
        name: "account",
        label: "Account",
        kind: AttrKind::Text,
    },
    AttrSpec {
        name: "name",
        label: "Name",
        kind: AttrKind::Text,
    },
    AttrSpec {
        name: "points",
        label: "Points",
        kind: AttrKind::Number,
    },
];

const USER_SORT_KEYS: [SortKeySpec; 6] = [
    SortKeySpec {
        id: "account_asc",
        label: "account asc",
        rule: SortRule::Lexical {
            attr: "account",
            direction: SortDirection::Asc,
        },
    },
    SortKeySpec {
        id: "account_desc",
        label: "account desc",
        rule: SortRule::Lexical {
            attr: "account",
            direction: SortDirection::Desc,
        },
    },
    SortKeySpec {
        id: "name_asc",
        label: "name asc",
        rule: SortRule::Lexical {
            attr: "name",
            direction: SortDirection::Asc,
        },
    },
    SortKeySpec {
        id: "name_desc",
        label: "name desc",
        rule: SortRule::Lexical {
            attr: "name",
            direction: SortDirection::Desc,
        },
    },
    SortKeySpec {
        id: "points_asc",
        label: "points asc",
        rule: SortRule::Numeric {
            attr: "points",
            direction: SortDirection::Asc,
        },
    },
    SortKeySpec {
        id: "points_desc",
        label: "points desc",
        rule: SortRule::Numeric {
            attr: "points",
            direction: SortDirection::Desc,
        },
    },
];

pub static USERS: ViewConfig = ViewConfig {
    kind: ViewKind::Users,
    attributes: &USER_ATTRIBUTES,
    category_attr: None,
    category_choices: &[],
    searchable: &["account", "name"],
    sort_keys: &USER_SORT_KEYS,
    default_sort: "account_asc",
    controls: ViewControls {
        category: false,
        query: true,
        sort: true,
    },
    edit: None,
    delete: None,
    timestamp_attr: None,
};

const LOG_ATTRIBUTES: [AttrSpec; 4] = [
    AttrSpec {
        name: "time",
        label: "Time",
        kind: AttrKind::Text,
    },
    AttrSpec {
        name: "account",
        label: "Operator",
        kind: AttrKind::Text,
    },
    AttrSpec {
        name: "url",
        label: "Action",
        kind: AttrKind::Text,
    },
    AttrSpec {
        name: "message",
        label: "Message",
        kind: AttrKind::Text,
    },
];

const LOG_SORT_KEYS: [SortKeySpec; 4] = [
    SortKeySpec {
        id: "time_desc",
        label: "time desc",
        rule: SortRule::Lexical {
            attr: "time",
            direction: SortDirection::Desc,
        },
    },
    SortKeySpec {
        id: "time_asc",
        label: "time asc",
        rule: SortRule::Lexical {
            attr: "time",
            direction: SortDirection::Asc,
        },
    },
    SortKeySpec {
        id: "account_asc",
        label: "operator asc",
        rule: SortRule::Lexical {
            attr: "account",
            direction: SortDirection::Asc,
        },
    },
    SortKeySpec {
        id: "account_desc",
        label: "operator desc",
        rule: SortRule::Lexical {
            attr: "account",
            direction: SortDirection::Desc,
        },
    },
];

pub static LOGS: ViewConfig = ViewConfig {
    kind: ViewKind::Logs,
    attributes: &LOG_ATTRIBUTES,
    category_attr: None,
    category_choices: &[],
    searchable: &["account", "message"],
    sort_keys: &LOG_SORT_KEYS,
    default_sort: "time_desc",
    controls: ViewControls {
        category: false,
        query: true,
        sort: true,
    },
    edit: None,
    delete: None,
    timestamp_attr: Some("time"),
};

pub fn entry_row_source(entry: &Entry) -> RowSource {
    let time = to_rfc3339(entry.time);
    let amount = entry.amount.to_string();
    let form = SubmissionForm::new(RECORD_UPDATE_ACTION)
        .field("account", entry.account.clone())
        .field("id", entry.id.get().to_string())
        .field("category", entry.category.as_str())
        .field("amount", amount.clone())
        .field("reason", entry.reason.clone());

    RowSource::new(entry.id.get().to_string())
        .attribute("time", time)
        .attribute("category", entry.category.as_str())
        .attribute("amount", amount)
        .attribute("reason", entry.reason.clone())
        .editor("category")
        .editor("amount")
        .editor("reason")
        .form(form)
}

pub fn user_row_source(user: &UserSummary) -> RowSource {
    RowSource::new(user.account.clone())
        .attribute("account", user.account.clone())
        .attribute("name", user.name.clone())
        .attribute("points", user.points.to_string())
}

pub fn log_row_source(log: &LogEntry) -> RowSource {
    RowSource::new(log.id.get().to_string())
        .attribute("time", to_rfc3339(log.time))
        .attribute("account", log.account.clone())
        .attribute("url", log.url.clone())
        .attribute("message", log.message.clone())
}
