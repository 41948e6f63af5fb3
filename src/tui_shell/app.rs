use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use tracing::{debug, info};

use crate::model::{Action, PlanStatus};
use crate::plan::{PlanProvider, VisualDirection};
use crate::protocol::{HostCommand, HostRequest, HostResponse, RequestId};
use crate::transport::HostLink;

use super::input::Input;
use super::keymap::{KeyAction, map_key};
use super::view::{render_view_chrome, row_line};

mod actions;
mod event_loop;
mod render;
mod runtime;

pub(super) use self::runtime::run;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum UiMode {
    Plan,
    Search,
    ConfirmAbort,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Notice {
    pub(super) text: String,
    pub(super) is_error: bool,
}

pub(super) struct App {
    provider: PlanProvider<HostLink>,
    title: String,
    mode: UiMode,
    input: Input,
    last_search: Option<String>,
    notice: Option<Notice>,

    // Lifecycle request awaiting the host's answer.
    pending: Option<(RequestId, &'static str)>,
    outcome: Option<PlanStatus>,

    quit: bool,
}

impl App {
    pub(super) fn new(provider: PlanProvider<HostLink>, title: String) -> Self {
        let mut app = Self {
            provider,
            title,
            mode: UiMode::Plan,
            input: Input::default(),
            last_search: None,
            notice: None,
            pending: None,
            outcome: None,
            quit: false,
        };
        if let Some(reason) = app.provider.state().read_only.clone() {
            app.push_error(format!("read-only: {}", reason));
        }
        app
    }

    pub(super) fn outcome(&self) -> Option<PlanStatus> {
        self.outcome
    }

    fn push_info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
        });
    }

    fn push_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: true,
        });
    }

    /// Applies host pushes and settles a pending lifecycle request.
    pub(super) fn poll_host(&mut self) {
        for notification in self.provider.sink_mut().poll() {
            self.provider.apply_notification(notification);
        }

        if let Some((id, name)) = self.pending {
            match self.provider.sink_mut().take_response(id) {
                Some(HostResponse::Ack { status }) => {
                    info!(command = name, ?status, "host acknowledged");
                    self.pending = None;
                    self.outcome = Some(status);
                    self.quit = status.is_finished();
                }
                Some(HostResponse::Rejected { reason }) => {
                    self.pending = None;
                    self.push_error(format!("{} rejected: {}", name, reason));
                }
                Some(HostResponse::State { state }) => {
                    self.pending = None;
                    self.provider.replace_state(state);
                }
                None => {}
            }
        }

        if self.provider.sink().is_disconnected() {
            debug!("host went away; closing editor");
            self.quit = true;
        }
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
