// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AppMode, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_view: ViewKind,
    pub help_visible: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_view: ViewKind::Entries,
            help_visible: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    FocusQuery,
    EnterEditMode,
    ExitToNav,
    ToggleHelp,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ViewChanged(ViewKind),
    HelpToggled(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_view(active_view: ViewKind) -> Self {
        Self {
            active_view,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::FocusQuery => {
                self.mode = AppMode::Query;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::EnterEditMode => {
                self.mode = AppMode::Edit;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ToggleHelp => {
                self.help_visible = !self.help_visible;
                vec![AppEvent::HelpToggled(self.help_visible)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_view = views[next];
        self.mode = AppMode::Nav;
        vec![AppEvent::ViewChanged(self.active_view)]
    }

    fn set_status(&mut self, message: String) -> AppEvent {
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}
