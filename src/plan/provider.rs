//! Optimistic editing state.
//!
//! Mutations land in the local [`PlanState`] first and the derived display
//! is rebuilt before the method returns, so a burst of key presses always
//! sees fresh indices. Each mutation is mirrored to the host as an
//! id-addressed command. Whatever the host pushes next replaces the local
//! plan wholesale.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Action, ActionChange, EntryId, PlanState};
use crate::protocol::{HostCommand, HostNotification};

use super::apply::apply_command;
use super::display::{DisplayOrder, DisplayRow, DropPosition};
use super::flags::{EntryFlags, derive_flags};
use super::moves::{ShiftDirection, batch_resting_index};
use super::selection::Selection;
use super::squash::{SquashInfo, oldest_commit_index};

/// Outbound side of the host connection.
pub trait CommandSink {
    fn send(&mut self, command: HostCommand);
}

impl CommandSink for Vec<HostCommand> {
    fn send(&mut self, command: HostCommand) {
        self.push(command);
    }
}

/// Direction as the user sees it on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualDirection {
    Up,
    Down,
}

pub struct PlanProvider<S> {
    state: PlanState,
    display: DisplayOrder,
    squash: SquashInfo,
    flags: Vec<EntryFlags>,
    selection: Selection,
    avatars: BTreeMap<String, String>,
    reported_sha: Option<String>,
    sink: S,
}

impl<S: CommandSink> PlanProvider<S> {
    pub fn new(state: PlanState, sink: S) -> Self {
        let mut provider = Self {
            state,
            display: DisplayOrder::default(),
            squash: SquashInfo::default(),
            flags: Vec::new(),
            selection: Selection::default(),
            avatars: BTreeMap::new(),
            reported_sha: None,
            sink,
        };
        provider.refresh();
        if let Some(first) = provider.display.rows().first() {
            let id = first.entry.id.clone();
            provider.selection.select_single(&id, &provider.display);
            provider.refresh_flags();
        }
        provider
    }

    pub fn state(&self) -> &PlanState {
        &self.state
    }

    pub fn display(&self) -> &DisplayOrder {
        &self.display
    }

    pub fn flags(&self) -> &[EntryFlags] {
        &self.flags
    }

    pub fn rows(&self) -> impl Iterator<Item = (&DisplayRow, EntryFlags)> {
        self.display.rows().iter().zip(self.flags.iter().copied())
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn avatars(&self) -> &BTreeMap<String, String> {
        &self.avatars
    }

    pub fn avatar_for_sha(&self, sha: &str) -> Option<&str> {
        let author = self.state.authors.get(sha)?;
        author
            .avatar_url
            .as_deref()
            .or_else(|| self.avatars.get(&author.name).map(String::as_str))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_read_only(&self) -> bool {
        self.state.is_read_only() || self.state.status.is_finished()
    }

    fn refresh(&mut self) {
        let state = &self.state;
        self.display = DisplayOrder::build(
            &state.entries,
            &state.done_entries,
            state.base.as_ref(),
            state.ascending,
        );
        self.squash = SquashInfo::compute(&state.entries);
        self.refresh_flags();
    }

    /// Re-derives row flags; enough after a selection-only change.
    fn refresh_flags(&mut self) {
        let state = &self.state;
        let oldest = oldest_commit_index(&state.entries).map(|i| &state.entries[i].id);
        let current = state.done_entries.last().map(|e| &e.id);
        self.flags = derive_flags(
            &self.display,
            &self.squash,
            oldest,
            current,
            &self.selection,
        );
    }

    fn retain_selection(&mut self) {
        self.selection.retain_present(&self.display);
        self.refresh_flags();
    }

    /// Applies `command` locally and forwards it when it changed anything.
    fn commit(&mut self, command: HostCommand) -> bool {
        if !apply_command(&mut self.state, &command) {
            return false;
        }
        self.refresh();
        self.retain_selection();
        debug!(command = command.name(), "applied optimistically");
        self.sink.send(command);
        true
    }

    /// Entries a batch operation acts on: the selection, else the focus.
    fn targets(&self) -> Vec<EntryId> {
        let ids = self.selection.ordered_ids(&self.state.entries);
        if !ids.is_empty() {
            return ids;
        }
        match self.selection.focused() {
            Some(id) if self.display.canonical_index_of(id).is_some() => vec![id.clone()],
            _ => Vec::new(),
        }
    }

    // Selection

    fn report_selection(&mut self) {
        self.refresh_flags();
        let sha = self.selection.primary_sha(&self.display).map(str::to_string);
        if sha != self.reported_sha {
            self.reported_sha = sha.clone();
            self.sink.send(HostCommand::UpdateSelection { sha });
        }
    }

    pub fn select_single(&mut self, id: &EntryId) {
        self.selection.select_single(id, &self.display);
        self.report_selection();
    }

    pub fn toggle(&mut self, id: &EntryId) {
        self.selection.toggle(id, &self.display);
        self.report_selection();
    }

    pub fn select_range(&mut self, anchor: &EntryId, target: &EntryId) {
        self.selection.select_range(anchor, target, &self.display);
        self.report_selection();
    }

    pub fn extend_to(&mut self, target: &EntryId) {
        self.selection.extend_to(target, &self.display);
        self.report_selection();
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.state.entries);
        self.report_selection();
    }

    /// Id of the row `delta` steps from the focus, clamped to the list.
    pub fn neighbour_of_focus(&self, delta: isize) -> Option<EntryId> {
        if self.display.is_empty() {
            return None;
        }
        let current = self
            .selection
            .focused()
            .and_then(|id| self.display.index_of(id))
            .unwrap_or(0);
        let last = self.display.len() - 1;
        let next = current.saturating_add_signed(delta).min(last);
        self.display.get(next).map(|r| r.entry.id.clone())
    }

    // Mutations

    pub fn move_entry(&mut self, id: &EntryId, to: usize) -> bool {
        let Ok(to) = i64::try_from(to) else {
            return false;
        };
        self.commit(HostCommand::MoveEntry {
            id: id.clone(),
            to,
            relative: false,
        })
    }

    /// Drops one row next to the display row `target`.
    pub fn drop_entry(&mut self, id: &EntryId, target: usize, position: DropPosition) -> bool {
        let Some((_, to)) = self.display.resolve_drop(id, target, position) else {
            return false;
        };
        self.move_entry(id, to)
    }

    /// Drops the whole selection next to the display row `target`.
    pub fn drop_selection(&mut self, target: usize, position: DropPosition) -> bool {
        let ids = self.targets();
        if ids.len() == 1 {
            return self.drop_entry(&ids[0], target, position);
        }
        let Some(insertion) = self.display.insertion_point(target, position) else {
            return false;
        };
        let to = batch_resting_index(&self.state.entries, &ids, insertion);
        self.move_entries(ids, to)
    }

    pub fn move_entries(&mut self, ids: Vec<EntryId>, to: usize) -> bool {
        if ids.is_empty() {
            return false;
        }
        self.commit(HostCommand::MoveEntries { ids, to })
    }

    /// Moves the selection directly on top of the base commit.
    pub fn move_selection_to_base(&mut self) -> bool {
        let ids = self.targets();
        match ids.as_slice() {
            [] => false,
            [only] => self.move_entry(only, 0),
            _ => self.move_entries(ids, 0),
        }
    }

    pub fn shift_selection(&mut self, direction: VisualDirection) -> bool {
        let ids = self.targets();
        if ids.is_empty() {
            return false;
        }
        // Ascending lists show older entries on top.
        let canonical = match direction {
            VisualDirection::Up => ShiftDirection::Up,
            VisualDirection::Down => ShiftDirection::Down,
        };
        let direction = if self.display.ascending() {
            canonical
        } else {
            canonical.flipped()
        };
        self.commit(HostCommand::ShiftEntries { ids, direction })
    }

    pub fn change_action(&mut self, id: &EntryId, action: Action) -> bool {
        self.commit(HostCommand::ChangeEntry {
            id: id.clone(),
            action,
        })
    }

    pub fn change_selected_actions(&mut self, action: Action) -> bool {
        let ids = self.targets();
        match ids.as_slice() {
            [] => false,
            [only] => self.change_action(only, action),
            _ => {
                let changes = ids
                    .into_iter()
                    .map(|id| ActionChange { id, action })
                    .collect();
                self.commit(HostCommand::ChangeEntries { changes })
            }
        }
    }

    pub fn set_ascending(&mut self, ascending: bool) -> bool {
        self.commit(HostCommand::Reorder { ascending })
    }

    pub fn toggle_order(&mut self) -> bool {
        let ascending = !self.state.ascending;
        self.set_ascending(ascending)
    }

    /// Forwards a command that has no local effect (lifecycle triggers).
    pub fn send(&mut self, command: HostCommand) {
        self.sink.send(command);
    }

    // Reconciliation

    pub fn apply_notification(&mut self, notification: HostNotification) {
        match notification {
            HostNotification::DidChange { state } => self.replace_state(state),
            HostNotification::DidChangeAvatars { avatars } => {
                debug!(count = avatars.len(), "merging avatars");
                self.avatars.extend(avatars);
            }
        }
    }

    /// Host snapshots always win, whatever was applied locally meanwhile.
    pub fn replace_state(&mut self, state: PlanState) {
        debug!(
            entries = state.entries.len(),
            done = state.done_entries.len(),
            "reconciling with host snapshot"
        );
        self.state = state;
        self.refresh();
        self.retain_selection();
    }
}
