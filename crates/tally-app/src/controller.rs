// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::debounce::Debouncer;
use crate::edit::{EditDraft, EditState, FormSubmitter, SaveOutcome, delete_form, fill_form};
use crate::filter::FilterState;
use crate::row::{RowSource, RowStore};
use crate::sort::{SortKeySpec, SortState};
use crate::view::{ViewOrder, render};
use crate::views::ViewConfig;

/// Current values of the view's input widgets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Controls {
    pub category: Option<String>,
    pub query: String,
    pub sort_key: Option<String>,
}

/// Filter, sort and inline-edit state for one table.
#[derive(Debug, Clone)]
pub struct TableController {
    config: &'static ViewConfig,
    store: RowStore,
    edits: Vec<EditState>,
    controls: Controls,
    filter: FilterState,
    sort: SortState,
    query_debounce: Debouncer,
    view: ViewOrder,
}

impl TableController {
    pub fn new(config: &'static ViewConfig, rows: Vec<RowSource>, debounce: Duration) -> Self {
        let store = RowStore::load(rows, config.attributes);
        let mut controller = Self {
            config,
            edits: vec![EditState::Viewing; store.len()],
            store,
            controls: Controls {
                category: None,
                query: String::new(),
                sort_key: config
                    .controls
                    .sort
                    .then(|| config.default_sort.to_owned()),
            },
            filter: FilterState::default(),
            sort: SortState::default(),
            query_debounce: Debouncer::new(debounce),
            view: ViewOrder::default(),
        };
        controller.recompute();
        controller
    }

    pub fn config(&self) -> &'static ViewConfig {
        self.config
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn view(&self) -> &ViewOrder {
        &self.view
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn active_sort(&self) -> Option<&'static SortKeySpec> {
        self.sort
            .key
            .as_deref()
            .and_then(|key| self.config.sort_key(key))
    }

    /// Replaces the rows, as after a submission reload. Control values
    /// survive; drafts do not.
    pub fn reload(&mut self, rows: Vec<RowSource>) {
        self.store = RowStore::load(rows, self.config.attributes);
        self.edits = vec![EditState::Viewing; self.store.len()];
        self.recompute();
    }

    pub fn recompute(&mut self) {
        let category = if self.config.controls.category {
            self.controls.category.as_deref()
        } else {
            None
        };
        let query = if self.config.controls.query {
            self.controls.query.as_str()
        } else {
            ""
        };
        self.filter = FilterState::from_controls(category, query);
        self.sort = if self.config.controls.sort {
            SortState {
                key: Some(
                    self.controls
                        .sort_key
                        .clone()
                        .unwrap_or_else(|| self.config.default_sort.to_owned()),
                ),
            }
        } else {
            SortState::default()
        };
        self.view = render(&self.store, &self.filter, &self.sort, self.config);
        debug!(
            view = self.config.kind.as_str(),
            visible = self.view.len(),
            total = self.store.len(),
            "view recomputed"
        );
    }

    /// Returns false when the view has no category selector.
    pub fn set_category(&mut self, category: Option<&str>) -> bool {
        if !self.config.controls.category {
            return false;
        }
        self.controls.category = category.map(str::to_owned);
        self.recompute();
        true
    }

    /// Steps through "no filter" followed by each category choice.
    pub fn cycle_category(&mut self) -> Option<&str> {
        let choices = self.config.category_choices;
        let next = match self.controls.category.as_deref() {
            None => choices.first().copied(),
            Some(current) => choices
                .iter()
                .position(|choice| *choice == current)
                .and_then(|index| choices.get(index + 1))
                .copied(),
        };
        self.set_category(next);
        self.controls.category.as_deref()
    }

    pub fn set_sort_key(&mut self, key: &str) -> bool {
        if !self.config.controls.sort {
            return false;
        }
        self.controls.sort_key = Some(key.to_owned());
        self.recompute();
        true
    }

    pub fn cycle_sort(&mut self, delta: isize) -> Option<&'static SortKeySpec> {
        let keys = self.config.sort_keys;
        if keys.is_empty() || !self.config.controls.sort {
            return None;
        }
        let current = self
            .active_sort()
            .and_then(|active| keys.iter().position(|spec| spec.id == active.id))
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(keys.len() as isize) as usize;
        self.set_sort_key(keys[next].id);
        self.active_sort()
    }

    /// Records typed text without recomputing; [`Self::poll`] applies it
    /// once input has been quiet for the debounce window.
    pub fn input_query(&mut self, text: impl Into<String>, now: Instant) -> bool {
        if !self.config.controls.query {
            return false;
        }
        self.controls.query = text.into();
        self.query_debounce.arm(now);
        true
    }

    pub fn query_pending(&self) -> bool {
        self.query_debounce.is_pending()
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.query_debounce.fire(now) {
            return false;
        }
        self.recompute();
        true
    }

    pub fn flush_query(&mut self) {
        if self.query_debounce.is_pending() {
            self.query_debounce.cancel();
            self.recompute();
        }
    }

    pub fn edit_state(&self, index: usize) -> Option<&EditState> {
        self.edits.get(index)
    }

    pub fn editing_count(&self) -> usize {
        self.edits.iter().filter(|state| state.is_editing()).count()
    }

    pub fn begin_edit(&mut self, index: usize) -> bool {
        let Some(spec) = &self.config.edit else {
            return false;
        };
        let (Some(row), Some(state)) = (self.store.get(index), self.edits.get_mut(index)) else {
            return false;
        };
        if state.is_editing() {
            return true;
        }
        *state = EditState::Editing(EditDraft::from_row(row, spec));
        info!(view = self.config.kind.as_str(), row = row.key().as_str(), "edit started");
        true
    }

    pub fn set_draft_value(&mut self, index: usize, attr: &str, value: impl Into<String>) -> bool {
        match self.edits.get_mut(index) {
            Some(EditState::Editing(draft)) => draft.set(attr, value),
            _ => false,
        }
    }

    pub fn cancel_edit(&mut self, index: usize) -> bool {
        let Some(state) = self.edits.get_mut(index) else {
            return false;
        };
        if !state.is_editing() {
            return false;
        }
        *state = EditState::Viewing;
        if let Some(row) = self.store.get(index) {
            info!(view = self.config.kind.as_str(), row = row.key().as_str(), "edit cancelled");
        }
        true
    }

    /// Value shown in an editor control: the draft while editing, the
    /// committed attribute otherwise.
    pub fn editor_value(&self, index: usize, attr: &str) -> Option<&str> {
        let row = self.store.get(index)?;
        match self.edits.get(index) {
            Some(EditState::Editing(draft)) => draft.get(attr).or(Some(row.text(attr))),
            _ => row.value(attr).map(|value| value.raw()),
        }
    }

    pub fn save<S>(&self, index: usize, submitter: &mut S) -> Result<SaveOutcome>
    where
        S: FormSubmitter + ?Sized,
    {
        let (Some(spec), Some(row), Some(EditState::Editing(draft))) = (
            self.config.edit.as_ref(),
            self.store.get(index),
            self.edits.get(index),
        ) else {
            return Ok(SaveOutcome::NotEditing);
        };

        let Some((form, payload_written)) = fill_form(row, draft, spec) else {
            warn!(row = row.key().as_str(), "row has no form; nothing submitted");
            return Ok(SaveOutcome::NoForm);
        };
        if !payload_written {
            warn!(
                row = row.key().as_str(),
                "row is missing editor controls or payload fields; submitting form as rendered"
            );
        }

        submitter.submit(&form)?;
        info!(
            view = self.config.kind.as_str(),
            row = row.key().as_str(),
            action = form.action(),
            payload_written,
            "row submitted"
        );
        Ok(SaveOutcome::Submitted { payload_written })
    }

    /// Submits the row's removal form. False when the view has no delete
    /// hook or the row's form lacks the identifying fields.
    pub fn delete<S>(&self, index: usize, submitter: &mut S) -> Result<bool>
    where
        S: FormSubmitter + ?Sized,
    {
        let (Some(spec), Some(row)) = (self.config.delete.as_ref(), self.store.get(index)) else {
            return Ok(false);
        };
        let Some(form) = delete_form(row, spec) else {
            warn!(row = row.key().as_str(), "row has no removal fields; nothing submitted");
            return Ok(false);
        };

        submitter.submit(&form)?;
        info!(
            view = self.config.kind.as_str(),
            row = row.key().as_str(),
            action = form.action(),
            "row delete submitted"
        );
        Ok(true)
    }
}
