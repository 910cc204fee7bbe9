// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tally_app::{
    AppCommand, AppMode, AppState, DEFAULT_DISPLAY_OFFSET, DEFAULT_QUERY_DEBOUNCE, EditableField,
    Entry, FormSubmitter, LogEntry, RowSource, SaveOutcome, TableController, UserSummary,
    ViewConfig, ViewKind, entry_row_source, localize, log_row_source, user_row_source,
};
use time::UtcOffset;
use tracing::{debug, info, warn};

/// Data access the TUI needs. Saved and deleted rows are handed to the
/// [`FormSubmitter`] half.
pub trait AppRuntime: FormSubmitter {
    fn load_entries(&mut self) -> Result<Vec<Entry>>;
    fn load_users(&mut self) -> Result<Vec<UserSummary>>;
    fn load_logs(&mut self) -> Result<Vec<LogEntry>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub query_debounce: Duration,
    pub display_offset: UtcOffset,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            query_debounce: DEFAULT_QUERY_DEBOUNCE,
            display_offset: DEFAULT_DISPLAY_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

/// One table plus the cursor over its display order.
#[derive(Debug, Clone)]
struct TablePane {
    controller: TableController,
    selected: usize,
}

impl TablePane {
    fn new(kind: ViewKind, debounce: Duration) -> Self {
        Self {
            controller: TableController::new(ViewConfig::for_kind(kind), Vec::new(), debounce),
            selected: 0,
        }
    }

    /// Store index under the cursor.
    fn selected_index(&self) -> Option<usize> {
        self.controller.view().row_at(self.selected)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.controller.view().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn select_last(&mut self) {
        self.selected = self.controller.view().len().saturating_sub(1);
    }

    /// Keeps the cursor on `previous` when it is still visible after a
    /// recompute; otherwise clamps it into range.
    fn follow(&mut self, previous: Option<usize>) {
        if let Some(position) = previous.and_then(|index| self.controller.view().position_of(index))
        {
            self.selected = position;
            return;
        }
        let len = self.controller.view().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn with_follow<T>(&mut self, change: impl FnOnce(&mut TableController) -> T) -> T {
        let previous = self.selected_index();
        let result = change(&mut self.controller);
        self.follow(previous);
        result
    }

    fn reload(&mut self, rows: Vec<RowSource>) {
        let previous_key = self
            .selected_index()
            .and_then(|index| self.controller.store().get(index))
            .map(|row| row.key().clone());
        self.controller.reload(rows);
        let previous = previous_key.and_then(|key| self.controller.store().position(&key));
        self.follow(previous);
    }
}

#[derive(Debug, Clone)]
struct ViewData {
    entries: TablePane,
    users: TablePane,
    logs: TablePane,
    /// Store index of the row receiving keystrokes in edit mode.
    editing_row: Option<usize>,
    edit_field: usize,
    /// Row armed by a first `d`; a second `d` on it deletes.
    pending_delete: Option<usize>,
    display_offset: UtcOffset,
    status_token: u64,
}

impl ViewData {
    fn new(options: UiOptions) -> Self {
        Self {
            entries: TablePane::new(ViewKind::Entries, options.query_debounce),
            users: TablePane::new(ViewKind::Users, options.query_debounce),
            logs: TablePane::new(ViewKind::Logs, options.query_debounce),
            editing_row: None,
            edit_field: 0,
            pending_delete: None,
            display_offset: options.display_offset,
            status_token: 0,
        }
    }

    fn pane(&self, kind: ViewKind) -> &TablePane {
        match kind {
            ViewKind::Entries => &self.entries,
            ViewKind::Users => &self.users,
            ViewKind::Logs => &self.logs,
        }
    }

    fn pane_mut(&mut self, kind: ViewKind) -> &mut TablePane {
        match kind {
            ViewKind::Entries => &mut self.entries,
            ViewKind::Users => &mut self.users,
            ViewKind::Logs => &mut self.logs,
        }
    }

    /// Applies any debounced query whose quiet period has elapsed.
    fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for pane in [&mut self.entries, &mut self.users, &mut self.logs] {
            changed |= pane.with_follow(|controller| controller.poll(now));
        }
        changed
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(runtime, &mut view_data) {
        warn!(error = %format!("{error:#}"), "initial load failed");
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error:#}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);
        view_data.poll(Instant::now());

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn refresh_view_data<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData) -> Result<()> {
    let entries = runtime.load_entries().context("load entries")?;
    let users = runtime.load_users().context("load users")?;
    let logs = runtime.load_logs().context("load logs")?;
    view_data
        .entries
        .reload(entries.iter().map(entry_row_source).collect());
    view_data
        .users
        .reload(users.iter().map(user_row_source).collect());
    view_data
        .logs
        .reload(logs.iter().map(log_row_source).collect());
    view_data.editing_row = None;
    view_data.pending_delete = None;
    debug!(
        entries = entries.len(),
        users = users.len(),
        logs = logs.len(),
        "view data refreshed"
    );
    Ok(())
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the app should quit.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    match state.mode {
        AppMode::Query => {
            handle_query_key(state, view_data, key, Instant::now());
            false
        }
        AppMode::Edit => {
            handle_edit_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let kind = state.active_view;
    let armed_delete = view_data.pending_delete.take();
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            state.dispatch(AppCommand::NextView);
        }
        KeyCode::BackTab => {
            state.dispatch(AppCommand::PrevView);
        }
        KeyCode::Char('j') | KeyCode::Down => view_data.pane_mut(kind).move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => view_data.pane_mut(kind).move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => view_data.pane_mut(kind).selected = 0,
        KeyCode::Char('G') | KeyCode::End => view_data.pane_mut(kind).select_last(),
        KeyCode::Char('?') => {
            state.dispatch(AppCommand::ToggleHelp);
        }
        KeyCode::Char('/') => {
            if ViewConfig::for_kind(kind).controls.query {
                state.dispatch(AppCommand::FocusQuery);
            } else {
                emit_status(state, view_data, internal_tx, "no search on this view");
            }
        }
        KeyCode::Char('c') => {
            if !ViewConfig::for_kind(kind).controls.category {
                let message = format!("no type filter on {}", kind.as_str());
                emit_status(state, view_data, internal_tx, message);
                return false;
            }
            let category = view_data
                .pane_mut(kind)
                .with_follow(|controller| controller.cycle_category().map(str::to_owned));
            let label = category.unwrap_or_else(|| "all".to_owned());
            emit_status(state, view_data, internal_tx, format!("type: {label}"));
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            let delta = if key.code == KeyCode::Char('s') { 1 } else { -1 };
            let spec = view_data
                .pane_mut(kind)
                .with_follow(|controller| controller.cycle_sort(delta));
            match spec {
                Some(spec) => {
                    emit_status(state, view_data, internal_tx, format!("sort: {}", spec.label));
                }
                None => emit_status(state, view_data, internal_tx, "no sort on this view"),
            }
        }
        KeyCode::Char('e') | KeyCode::Enter => begin_edit(state, view_data, internal_tx),
        KeyCode::Char('x') => {
            let pane = view_data.pane_mut(kind);
            let discarded = pane
                .selected_index()
                .is_some_and(|index| pane.controller.cancel_edit(index));
            if discarded {
                emit_status(state, view_data, internal_tx, "draft discarded");
            }
        }
        KeyCode::Char('d') => delete_selected(state, runtime, view_data, internal_tx, armed_delete),
        KeyCode::Char('r') => match refresh_view_data(runtime, view_data) {
            Ok(()) => emit_status(state, view_data, internal_tx, "reloaded"),
            Err(error) => {
                emit_status(state, view_data, internal_tx, format!("reload failed: {error:#}"));
            }
        },
        KeyCode::Esc => {
            state.dispatch(AppCommand::ClearStatus);
        }
        _ => {}
    }
    false
}

fn handle_query_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent, now: Instant) {
    let pane = view_data.pane_mut(state.active_view);
    match key.code {
        KeyCode::Enter => {
            pane.with_follow(TableController::flush_query);
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Esc => {
            pane.controller.input_query("", now);
            pane.with_follow(TableController::flush_query);
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            let mut query = pane.controller.controls().query.clone();
            query.pop();
            pane.controller.input_query(query, now);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut query = pane.controller.controls().query.clone();
            query.push(ch);
            pane.controller.input_query(query, now);
        }
        _ => {}
    }
}

fn begin_edit(state: &mut AppState, view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    let kind = state.active_view;
    if ViewConfig::for_kind(kind).edit.is_none() {
        let message = format!("{} are read-only", kind.as_str());
        emit_status(state, view_data, internal_tx, message);
        return;
    }
    let pane = view_data.pane_mut(kind);
    let Some(index) = pane.selected_index() else {
        emit_status(state, view_data, internal_tx, "nothing selected");
        return;
    };
    if !pane.controller.begin_edit(index) {
        emit_status(state, view_data, internal_tx, "row cannot be edited");
        return;
    }
    view_data.editing_row = Some(index);
    view_data.edit_field = 0;
    state.dispatch(AppCommand::EnterEditMode);
}

/// First press arms the selected row, a second press on the same row
/// submits its removal form and reloads.
fn delete_selected<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    armed: Option<usize>,
) {
    let kind = state.active_view;
    if ViewConfig::for_kind(kind).delete.is_none() {
        let message = format!("{} are read-only", kind.as_str());
        emit_status(state, view_data, internal_tx, message);
        return;
    }
    let Some(index) = view_data.pane(kind).selected_index() else {
        emit_status(state, view_data, internal_tx, "nothing selected");
        return;
    };
    if armed != Some(index) {
        view_data.pending_delete = Some(index);
        emit_status(state, view_data, internal_tx, "press d again to delete this entry");
        return;
    }

    match view_data.pane(kind).controller.delete(index, runtime) {
        Ok(true) => match refresh_view_data(runtime, view_data) {
            Ok(()) => emit_status(state, view_data, internal_tx, "entry deleted"),
            Err(error) => emit_status(
                state,
                view_data,
                internal_tx,
                format!("entry deleted; reload failed: {error:#}"),
            ),
        },
        Ok(false) => emit_status(state, view_data, internal_tx, "row cannot be deleted"),
        Err(error) => {
            warn!(error = %format!("{error:#}"), "delete failed");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("delete failed: {error:#}"),
            );
        }
    }
}

fn edit_fields(kind: ViewKind) -> &'static [EditableField] {
    ViewConfig::for_kind(kind)
        .edit
        .as_ref()
        .map(|spec| spec.fields)
        .unwrap_or(&[])
}

fn handle_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let kind = state.active_view;
    let fields = edit_fields(kind);
    let Some(index) = view_data.editing_row.filter(|_| !fields.is_empty()) else {
        view_data.editing_row = None;
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let attr = fields[view_data.edit_field % fields.len()].attr;

    match key.code {
        KeyCode::Tab => view_data.edit_field = (view_data.edit_field + 1) % fields.len(),
        KeyCode::BackTab => {
            view_data.edit_field = (view_data.edit_field + fields.len() - 1) % fields.len();
        }
        KeyCode::Esc => {
            view_data.pane_mut(kind).controller.cancel_edit(index);
            view_data.editing_row = None;
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "edit cancelled");
        }
        KeyCode::Up | KeyCode::Down => {
            view_data.editing_row = None;
            state.dispatch(AppCommand::ExitToNav);
            let delta = if key.code == KeyCode::Down { 1 } else { -1 };
            view_data.pane_mut(kind).move_selection(delta);
            emit_status(state, view_data, internal_tx, "draft kept");
        }
        KeyCode::Enter => save_edit(state, runtime, view_data, internal_tx, index),
        KeyCode::Backspace => {
            let controller = &mut view_data.pane_mut(kind).controller;
            let mut value = controller
                .editor_value(index, attr)
                .unwrap_or_default()
                .to_owned();
            value.pop();
            controller.set_draft_value(index, attr, value);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let controller = &mut view_data.pane_mut(kind).controller;
            let mut value = controller
                .editor_value(index, attr)
                .unwrap_or_default()
                .to_owned();
            value.push(ch);
            controller.set_draft_value(index, attr, value);
        }
        _ => {}
    }
}

/// Submits the draft, then reloads both views whatever the outcome.
fn save_edit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    index: usize,
) {
    let outcome = view_data
        .pane(state.active_view)
        .controller
        .save(index, runtime);
    view_data.editing_row = None;
    state.dispatch(AppCommand::ExitToNav);

    let mut message = match outcome {
        Ok(SaveOutcome::Submitted {
            payload_written: true,
        }) => "saved".to_owned(),
        Ok(SaveOutcome::Submitted {
            payload_written: false,
        }) => "row is missing edit fields; submitted it unchanged".to_owned(),
        Ok(SaveOutcome::NoForm) => "row has no form; nothing saved".to_owned(),
        Ok(SaveOutcome::NotEditing) => "row is not being edited".to_owned(),
        Err(error) => {
            warn!(error = %format!("{error:#}"), "save failed");
            format!("save failed: {error:#}")
        }
    };
    if let Err(error) = refresh_view_data(runtime, view_data) {
        message = format!("{message}; reload failed: {error:#}");
    }
    info!(status = message.as_str(), "save finished");
    emit_status(state, view_data, internal_tx, message);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|kind| *kind == state.active_view)
        .unwrap_or(0);
    let titles = ViewKind::ALL
        .iter()
        .map(|kind| tab_title(*kind, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("tally").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if state.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: j/k move | g/G first/last | tab/shift+tab view | r reload | q quit\n\
nav: / search | c cycle type filter | s/S cycle sort\n\
nav: e or enter edit row (resumes a kept draft) | x discard draft | d d delete entry\n\
search: type to filter | enter apply | esc clear\n\
edit: tab/shift+tab field | type to change | up/down keep draft and move | enter save | esc cancel"
}

fn tab_title(kind: ViewKind, view_data: &ViewData) -> String {
    let controller = &view_data.pane(kind).controller;
    format!(
        "{} {}/{}",
        kind.label(),
        controller.view().len(),
        controller.store().len()
    )
}

fn table_title(controller: &TableController) -> String {
    let config = controller.config();
    let controls = controller.controls();
    let mut parts = vec![config.kind.as_str().to_owned()];
    if config.controls.category
        && let Some(category) = &controls.category
    {
        parts.push(format!("type: {category}"));
    }
    if config.controls.query && !controls.query.is_empty() {
        let pending = if controller.query_pending() { "…" } else { "" };
        parts.push(format!("search: {:?}{pending}", controls.query));
    }
    if let Some(spec) = controller.active_sort() {
        parts.push(format!("sort: {}", spec.label));
    }
    parts.join(" | ")
}

/// Text shown for one cell: the draft while the row is being edited, the
/// localized time for the view's timestamp attribute, the raw value
/// otherwise.
fn cell_text(controller: &TableController, index: usize, attr: &str, offset: UtcOffset) -> String {
    let config = controller.config();
    let editing = controller
        .edit_state(index)
        .is_some_and(|state| state.is_editing());
    let editable = config
        .edit
        .as_ref()
        .is_some_and(|spec| spec.fields.iter().any(|field| field.attr == attr));
    if editing && editable {
        return controller
            .editor_value(index, attr)
            .unwrap_or_default()
            .to_owned();
    }

    let raw = controller
        .store()
        .get(index)
        .map(|row| row.text(attr))
        .unwrap_or_default();
    if config.timestamp_attr == Some(attr) {
        return localize(raw, offset).unwrap_or_else(|| raw.to_owned());
    }
    raw.to_owned()
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let pane = view_data.pane(state.active_view);
    let controller = &pane.controller;
    let config = controller.config();
    let active_attr = (state.mode == AppMode::Edit)
        .then(|| edit_fields(state.active_view))
        .and_then(|fields| fields.get(view_data.edit_field % fields.len().max(1)))
        .map(|field| field.attr);

    let header = Row::new(config.attributes.iter().map(|spec| {
        Cell::from(spec.label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = controller
        .view()
        .order
        .iter()
        .enumerate()
        .map(|(position, index)| {
            let selected_row = position == pane.selected;
            let drafting = controller
                .edit_state(*index)
                .is_some_and(|state| state.is_editing());
            let cells = config
                .attributes
                .iter()
                .map(|spec| {
                    let text = cell_text(controller, *index, spec.name, view_data.display_offset);
                    let mut style = Style::default();
                    if drafting {
                        style = style.fg(Color::Yellow);
                    }
                    if selected_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if selected_row
                        && view_data.editing_row == Some(*index)
                        && active_attr == Some(spec.name)
                    {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(text).style(style)
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        });

    let widths = vec![Constraint::Min(8); config.attributes.len().max(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(controller))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let controller = &view_data.pane(state.active_view).controller;
    let (mode, hints) = match state.mode {
        AppMode::Nav => (
            "NAV",
            "j/k g/G | tab view | / search | c type | s/S sort | e edit | x discard | d delete | r reload | ? help | q quit"
                .to_owned(),
        ),
        AppMode::Query => (
            "SEARCH",
            format!(
                "search: {}_ | enter apply | esc clear",
                controller.controls().query
            ),
        ),
        AppMode::Edit => {
            let fields = edit_fields(state.active_view);
            let field = fields.get(view_data.edit_field % fields.len().max(1));
            let prompt = match (field, view_data.editing_row) {
                (Some(field), Some(index)) => {
                    let label = controller
                        .config()
                        .attributes
                        .iter()
                        .find(|spec| spec.name == field.attr)
                        .map(|spec| spec.label)
                        .unwrap_or(field.attr);
                    let value = controller
                        .editor_value(index, field.attr)
                        .unwrap_or_default();
                    format!("{label}: {value}_")
                }
                _ => String::new(),
            };
            (
                "EDIT",
                format!("{prompt} | tab field | up/down keep | enter save | esc cancel"),
            )
        }
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, UiOptions, ViewData, cell_text, emit_status, handle_key_event,
        handle_query_key, help_overlay_text, process_internal_events, refresh_view_data,
        status_text, table_title,
    };
    use anyhow::bail;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};
    use tally_app::{
        AppMode, AppState, DEFAULT_DISPLAY_OFFSET, Entry, EntryCategory, FormSubmitter, LogEntry,
        LogId, RECORD_DELETE_ACTION, RecordId, SubmissionForm, UserSummary, ViewKind,
    };
    use time::macros::datetime;

    #[derive(Debug, Default)]
    struct TestRuntime {
        entries: Vec<Entry>,
        users: Vec<UserSummary>,
        logs: Vec<LogEntry>,
        submitted: Vec<SubmissionForm>,
        fail_submit: bool,
        load_count: usize,
    }

    impl TestRuntime {
        fn sample() -> Self {
            Self {
                entries: vec![
                    Entry {
                        id: RecordId::new(1),
                        account: "113000001".to_owned(),
                        time: datetime!(2024-01-01 00:00:00 UTC),
                        category: EntryCategory::Add,
                        amount: 10,
                        reason: "init".to_owned(),
                    },
                    Entry {
                        id: RecordId::new(2),
                        account: "113000001".to_owned(),
                        time: datetime!(2024-01-02 00:00:00 UTC),
                        category: EntryCategory::Remove,
                        amount: -3,
                        reason: "fix".to_owned(),
                    },
                ],
                users: vec![
                    UserSummary {
                        account: "113000001".to_owned(),
                        name: "Avery Walker".to_owned(),
                        points: 7,
                        record_count: 2,
                    },
                    UserSummary {
                        account: "113000002".to_owned(),
                        name: "Jordan Hill".to_owned(),
                        points: 0,
                        record_count: 0,
                    },
                ],
                logs: vec![
                    LogEntry {
                        id: LogId::new(1),
                        account: "113000003".to_owned(),
                        time: datetime!(2024-01-01 00:00:00 UTC),
                        url: "/admin/adjust".to_owned(),
                        message: "Add 10 points from 113000001 Avery Walker for the reason [ init ]"
                            .to_owned(),
                    },
                    LogEntry {
                        id: LogId::new(2),
                        account: "113000001".to_owned(),
                        time: datetime!(2024-01-03 00:00:00 UTC),
                        url: "/admin/record/update".to_owned(),
                        message: "Update record 2 for 113000001".to_owned(),
                    },
                ],
                ..Self::default()
            }
        }
    }

    impl FormSubmitter for TestRuntime {
        fn submit(&mut self, form: &SubmissionForm) -> anyhow::Result<()> {
            if self.fail_submit {
                bail!("record {} not found", form.value("id").unwrap_or_default());
            }
            self.submitted.push(form.clone());
            Ok(())
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_entries(&mut self) -> anyhow::Result<Vec<Entry>> {
            self.load_count += 1;
            Ok(self.entries.clone())
        }

        fn load_users(&mut self) -> anyhow::Result<Vec<UserSummary>> {
            Ok(self.users.clone())
        }

        fn load_logs(&mut self) -> anyhow::Result<Vec<LogEntry>> {
            Ok(self.logs.clone())
        }
    }

    fn view_data_for_test(runtime: &mut TestRuntime) -> anyhow::Result<ViewData> {
        let mut view_data = ViewData::new(UiOptions {
            query_debounce: Duration::from_millis(50),
            display_offset: DEFAULT_DISPLAY_OFFSET,
        });
        refresh_view_data(runtime, &mut view_data)?;
        Ok(view_data)
    }

    fn internal_tx() -> mpsc::Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        keys: &[KeyEvent],
    ) -> bool {
        let tx = internal_tx();
        let mut quit = false;
        for key in keys {
            quit |= handle_key_event(state, runtime, view_data, &tx, *key);
        }
        quit
    }

    fn type_text(text: &str) -> Vec<KeyEvent> {
        text.chars().map(|ch| key(KeyCode::Char(ch))).collect()
    }

    fn visible_ids(view_data: &ViewData, kind: ViewKind) -> Vec<String> {
        let controller = &view_data.pane(kind).controller;
        controller
            .view()
            .order
            .iter()
            .filter_map(|index| controller.store().get(*index))
            .map(|row| row.key().as_str().to_owned())
            .collect()
    }

    #[test]
    fn initial_load_orders_entries_newest_first() -> anyhow::Result<()> {
        let mut runtime = TestRuntime::sample();
        let view_data = view_data_for_test(&mut runtime)?;
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["2", "1"]);
        assert_eq!(
            visible_ids(&view_data, ViewKind::Users),
            vec!["113000001", "113000002"]
        );
        Ok(())
    }

    #[test]
    fn tab_cycles_views_and_q_quits() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        assert!(!press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Tab)]));
        assert_eq!(state.active_view, ViewKind::Users);
        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::BackTab)]);
        assert_eq!(state.active_view, ViewKind::Entries);

        assert!(press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('q'))]
        ));
        assert!(press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)]
        ));
        Ok(())
    }

    #[test]
    fn typed_query_waits_for_debounce() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;
        let start = Instant::now();

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('/'))]);
        assert_eq!(state.mode, AppMode::Query);
        for ch in "ini".chars() {
            handle_query_key(&mut state, &mut view_data, key(KeyCode::Char(ch)), start);
        }
        assert_eq!(visible_ids(&view_data, ViewKind::Entries).len(), 2);
        assert!(!view_data.poll(start + Duration::from_millis(10)));

        assert!(view_data.poll(start + Duration::from_millis(60)));
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["1"]);
        Ok(())
    }

    #[test]
    fn enter_applies_query_immediately_and_esc_clears_it() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        let mut keys = vec![key(KeyCode::Char('/'))];
        keys.extend(type_text("FIX"));
        keys.push(key(KeyCode::Enter));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["2"]);

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('/')), key(KeyCode::Esc)],
        );
        assert_eq!(state.mode, AppMode::Nav);
        assert!(view_data.entries.controller.controls().query.is_empty());
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["2", "1"]);
        Ok(())
    }

    #[test]
    fn category_key_cycles_filter_on_entries_only() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('c'))]);
        assert_eq!(state.status_line.as_deref(), Some("type: add"));
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["1"]);

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('c'))]);
        assert_eq!(state.status_line.as_deref(), Some("type: remove"));
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["2"]);

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('c'))]);
        assert_eq!(state.status_line.as_deref(), Some("type: all"));
        assert_eq!(visible_ids(&view_data, ViewKind::Entries).len(), 2);

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Tab), key(KeyCode::Char('c'))],
        );
        assert_eq!(state.status_line.as_deref(), Some("no type filter on users"));
        Ok(())
    }

    #[test]
    fn sort_keys_cycle_and_selection_follows_row() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('j'))]);
        assert_eq!(view_data.entries.selected, 1);
        assert_eq!(view_data.entries.selected_index(), Some(0));

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('S'))]);
        assert_eq!(state.status_line.as_deref(), Some("sort: time asc"));
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["1", "2"]);
        assert_eq!(view_data.entries.selected, 0);
        assert_eq!(view_data.entries.selected_index(), Some(0));

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('s')), key(KeyCode::Char('s'))],
        );
        assert_eq!(state.status_line.as_deref(), Some("sort: amount asc"));
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["2", "1"]);
        Ok(())
    }

    #[test]
    fn edit_and_save_submits_draft_then_reloads() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;
        let loads_before = runtime.load_count;

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('e'))]);
        assert_eq!(state.mode, AppMode::Edit);
        assert_eq!(view_data.editing_row, Some(1));

        let mut keys = vec![key(KeyCode::Tab)];
        keys.extend([key(KeyCode::Backspace), key(KeyCode::Backspace)]);
        keys.extend(type_text("-5"));
        keys.push(key(KeyCode::Tab));
        keys.extend([key(KeyCode::Backspace); 3]);
        keys.extend(type_text("refund"));
        keys.push(key(KeyCode::Enter));
        press(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.status_line.as_deref(), Some("saved"));
        assert_eq!(runtime.submitted.len(), 1);
        let form = &runtime.submitted[0];
        assert_eq!(form.value("id"), Some("2"));
        assert_eq!(form.value("account"), Some("113000001"));
        assert_eq!(form.value("category"), Some("remove"));
        assert_eq!(form.value("amount"), Some("-5"));
        assert_eq!(form.value("reason"), Some("refund"));
        assert_eq!(runtime.load_count, loads_before + 1);
        assert_eq!(view_data.entries.controller.editing_count(), 0);
        Ok(())
    }

    #[test]
    fn cleared_category_draft_is_submitted_as_add() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        let mut keys = vec![key(KeyCode::Char('e'))];
        keys.extend([key(KeyCode::Backspace); 6]);
        keys.push(key(KeyCode::Enter));
        press(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(runtime.submitted[0].value("category"), Some("add"));
        assert_eq!(runtime.submitted[0].value("amount"), Some("-3"));
        Ok(())
    }

    #[test]
    fn esc_cancels_edit_and_restores_values() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        let mut keys = vec![key(KeyCode::Char('e')), key(KeyCode::Tab)];
        keys.extend(type_text("00"));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(
            view_data.entries.controller.editor_value(1, "amount"),
            Some("-300")
        );

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Esc)]);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.status_line.as_deref(), Some("edit cancelled"));
        assert_eq!(
            view_data.entries.controller.editor_value(1, "amount"),
            Some("-3")
        );
        assert!(runtime.submitted.is_empty());
        Ok(())
    }

    #[test]
    fn failed_save_reports_status_and_still_reloads() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            fail_submit: true,
            ..TestRuntime::sample()
        };
        let mut view_data = view_data_for_test(&mut runtime)?;
        let loads_before = runtime.load_count;

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('e')), key(KeyCode::Enter)],
        );
        assert_eq!(
            state.status_line.as_deref(),
            Some("save failed: record 2 not found")
        );
        assert_eq!(runtime.load_count, loads_before + 1);
        assert_eq!(state.mode, AppMode::Nav);
        Ok(())
    }

    #[test]
    fn users_view_is_read_only() -> anyhow::Result<()> {
        let mut state = AppState::with_view(ViewKind::Users);
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.status_line.as_deref(), Some("users are read-only"));
        Ok(())
    }

    #[test]
    fn draft_survives_filter_and_can_be_discarded() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        let mut keys = vec![key(KeyCode::Char('e')), key(KeyCode::Tab), key(KeyCode::Tab)];
        keys.extend(type_text("!"));
        keys.push(key(KeyCode::Up));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(view_data.editing_row, None);
        assert_eq!(state.status_line.as_deref(), Some("draft kept"));
        assert_eq!(view_data.entries.controller.editing_count(), 1);

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('c'))]);
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["1"]);
        assert_eq!(
            view_data.entries.controller.editor_value(1, "reason"),
            Some("fix!")
        );

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('c')), key(KeyCode::Char('x'))],
        );
        assert_eq!(view_data.entries.selected_index(), Some(1));
        assert_eq!(state.status_line.as_deref(), Some("draft discarded"));
        assert_eq!(view_data.entries.controller.editing_count(), 0);
        Ok(())
    }

    #[test]
    fn kept_drafts_stack_and_resume() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        let mut keys = vec![key(KeyCode::Char('e')), key(KeyCode::Tab), key(KeyCode::Tab)];
        keys.extend(type_text("!"));
        keys.push(key(KeyCode::Down));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(view_data.entries.selected_index(), Some(0));

        let mut keys = vec![key(KeyCode::Char('e')), key(KeyCode::Tab), key(KeyCode::Tab)];
        keys.extend(type_text("?"));
        keys.push(key(KeyCode::Up));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        let controller = &view_data.entries.controller;
        assert_eq!(controller.editing_count(), 2);
        assert_eq!(controller.editor_value(1, "reason"), Some("fix!"));
        assert_eq!(controller.editor_value(0, "reason"), Some("init?"));
        assert_eq!(view_data.entries.selected_index(), Some(1));

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('e'))]);
        assert_eq!(state.mode, AppMode::Edit);
        assert_eq!(view_data.editing_row, Some(1));
        assert_eq!(
            view_data.entries.controller.editor_value(1, "reason"),
            Some("fix!")
        );

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Esc)]);
        let controller = &view_data.entries.controller;
        assert_eq!(controller.editing_count(), 1);
        assert_eq!(controller.editor_value(0, "reason"), Some("init?"));
        assert!(runtime.submitted.is_empty());
        Ok(())
    }

    #[test]
    fn delete_needs_a_second_press_on_the_same_row() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;
        let loads = runtime.load_count;

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('d')), key(KeyCode::Char('j')), key(KeyCode::Char('d'))],
        );
        assert!(runtime.submitted.is_empty());
        assert_eq!(
            state.status_line.as_deref(),
            Some("press d again to delete this entry")
        );

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('d'))]);
        assert_eq!(runtime.submitted.len(), 1);
        let form = &runtime.submitted[0];
        assert_eq!(form.action(), RECORD_DELETE_ACTION);
        assert_eq!(form.value("id"), Some("1"));
        assert_eq!(form.value("account"), Some("113000001"));
        assert_eq!(form.value("reason"), None);
        assert_eq!(runtime.load_count, loads + 1);
        assert_eq!(state.status_line.as_deref(), Some("entry deleted"));
        assert_eq!(view_data.pending_delete, None);
        Ok(())
    }

    #[test]
    fn failed_delete_reports_error() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            fail_submit: true,
            ..TestRuntime::sample()
        };
        let mut view_data = view_data_for_test(&mut runtime)?;

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('d')), key(KeyCode::Char('d'))],
        );
        assert_eq!(
            state.status_line.as_deref(),
            Some("delete failed: record 2 not found")
        );
        assert_eq!(visible_ids(&view_data, ViewKind::Entries), vec!["2", "1"]);
        Ok(())
    }

    #[test]
    fn logs_view_is_searchable_and_read_only() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Tab), key(KeyCode::Tab)],
        );
        assert_eq!(state.active_view, ViewKind::Logs);
        assert_eq!(visible_ids(&view_data, ViewKind::Logs), vec!["2", "1"]);
        let controller = &view_data.logs.controller;
        assert_eq!(
            cell_text(controller, 1, "time", DEFAULT_DISPLAY_OFFSET),
            "2024-01-03 08:00:00"
        );

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('e'))]);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.status_line.as_deref(), Some("logs are read-only"));
        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('d'))]);
        assert_eq!(state.status_line.as_deref(), Some("logs are read-only"));
        assert!(runtime.submitted.is_empty());

        let mut keys = vec![key(KeyCode::Char('/'))];
        keys.extend(type_text("113000003"));
        keys.push(key(KeyCode::Enter));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(visible_ids(&view_data, ViewKind::Logs), vec!["1"]);

        let mut keys = vec![key(KeyCode::Char('/')), key(KeyCode::Esc), key(KeyCode::Char('/'))];
        keys.extend(type_text("UPDATE record"));
        keys.push(key(KeyCode::Enter));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(visible_ids(&view_data, ViewKind::Logs), vec!["2"]);
        Ok(())
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('?'))]);
        assert!(state.help_visible);
        assert!(!press(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('q')), key(KeyCode::Tab)]
        ));
        assert_eq!(state.active_view, ViewKind::Entries);

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Esc)]);
        assert!(!state.help_visible);
        assert!(help_overlay_text().contains("enter save"));
        Ok(())
    }

    #[test]
    fn stale_clear_status_token_is_ignored() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;
        let (tx, rx) = mpsc::channel();

        emit_status(&mut state, &mut view_data, &tx, "first");
        emit_status(&mut state, &mut view_data, &tx, "second");
        tx.send(InternalEvent::ClearStatus { token: 1 })?;
        process_internal_events(&mut state, &mut view_data, &rx);
        assert_eq!(state.status_line.as_deref(), Some("second"));

        tx.send(InternalEvent::ClearStatus {
            token: view_data.status_token,
        })?;
        process_internal_events(&mut state, &mut view_data, &rx);
        assert_eq!(state.status_line, None);
        Ok(())
    }

    #[test]
    fn cells_localize_time_and_show_drafts() -> anyhow::Result<()> {
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;
        let offset = view_data.display_offset;

        let controller = &view_data.entries.controller;
        assert_eq!(cell_text(controller, 1, "time", offset), "2024-01-02 08:00:00");
        assert_eq!(cell_text(controller, 1, "amount", offset), "-3");

        let controller = &mut view_data.entries.controller;
        controller.begin_edit(1);
        controller.set_draft_value(1, "reason", "refund");
        assert_eq!(cell_text(controller, 1, "reason", offset), "refund");
        assert_eq!(cell_text(controller, 0, "reason", offset), "init");
        Ok(())
    }

    #[test]
    fn table_title_summarizes_controls() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        assert_eq!(
            table_title(&view_data.entries.controller),
            "entries | sort: time desc"
        );

        let mut keys = vec![key(KeyCode::Char('c')), key(KeyCode::Char('/'))];
        keys.extend(type_text("in"));
        keys.push(key(KeyCode::Enter));
        press(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(
            table_title(&view_data.entries.controller),
            "entries | type: add | search: \"in\" | sort: time desc"
        );
        assert_eq!(
            table_title(&view_data.users.controller),
            "users | sort: account asc"
        );
        Ok(())
    }

    #[test]
    fn status_text_reflects_mode() -> anyhow::Result<()> {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::sample();
        let mut view_data = view_data_for_test(&mut runtime)?;

        assert!(status_text(&state, &view_data).starts_with("NAV | j/k"));

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('e'))]);
        let text = status_text(&state, &view_data);
        assert!(text.starts_with("EDIT | Type: remove_"), "{text}");

        press(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Esc)]);
        let text = status_text(&state, &view_data);
        assert!(text.starts_with("NAV | edit cancelled | "), "{text}");
        Ok(())
    }
}
