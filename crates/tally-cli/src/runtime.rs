// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use tally_app::{Entry, FormSubmitter, LogEntry, SubmissionForm, UserSummary};
use tally_db::{
    Outcome, RECORD_DELETE_URL, RECORD_UPDATE_URL, RecordDeleteRequest, RecordUpdateRequest,
    Store,
};
use tracing::{info, warn};

/// Audit lines are pruned to a week; this bounds a busy week.
const LOG_VIEW_LIMIT: usize = 1000;

pub struct DbRuntime<'a> {
    store: &'a Store,
    target: Option<String>,
    operator: Option<String>,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            target: None,
            operator: None,
        }
    }

    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    pub fn with_operator(mut self, operator: Option<String>) -> Self {
        self.operator = operator;
        self
    }

    fn submit_update(&self, form: &SubmissionForm) -> Result<()> {
        let request = RecordUpdateRequest::from_form(form);
        match self
            .store
            .update_record(self.operator.as_deref(), &request)?
        {
            Outcome::Applied(change) => {
                info!(
                    record = change.id.get(),
                    account = change.account.as_str(),
                    noop = change.is_noop(),
                    "record update applied"
                );
                Ok(())
            }
            Outcome::Rejected(rejection) => {
                warn!(
                    record = request.id.as_str(),
                    account = request.account.as_str(),
                    %rejection,
                    "record update rejected"
                );
                bail!("{rejection}")
            }
        }
    }

    fn submit_delete(&self, form: &SubmissionForm) -> Result<()> {
        let request = RecordDeleteRequest::from_form(form);
        match self
            .store
            .delete_record(self.operator.as_deref(), &request)?
        {
            Outcome::Applied(entry) => {
                info!(
                    record = entry.id.get(),
                    account = entry.account.as_str(),
                    amount = entry.amount,
                    "record delete applied"
                );
                Ok(())
            }
            Outcome::Rejected(rejection) => {
                warn!(
                    record = request.id.as_str(),
                    account = request.account.as_str(),
                    %rejection,
                    "record delete rejected"
                );
                bail!("{rejection}")
            }
        }
    }
}

impl FormSubmitter for DbRuntime<'_> {
    fn submit(&mut self, form: &SubmissionForm) -> Result<()> {
        match form.action() {
            RECORD_UPDATE_URL => self.submit_update(form),
            RECORD_DELETE_URL => self.submit_delete(form),
            other => bail!(
                "unsupported form action {other:?}; only {RECORD_UPDATE_URL} and {RECORD_DELETE_URL} are handled"
            ),
        }
    }
}

impl tally_tui::AppRuntime for DbRuntime<'_> {
    fn load_entries(&mut self) -> Result<Vec<Entry>> {
        self.store.list_entries(self.target.as_deref())
    }

    fn load_users(&mut self) -> Result<Vec<UserSummary>> {
        self.store.list_user_summaries()
    }

    fn load_logs(&mut self) -> Result<Vec<LogEntry>> {
        self.store.list_logs(None, LOG_VIEW_LIMIT)
    }
}
