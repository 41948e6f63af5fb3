use super::*;

impl App {
    pub(super) fn perform(&mut self, action: KeyAction) {
        if action.is_mutation() && self.provider.is_read_only() {
            let reason = self
                .provider
                .state()
                .read_only
                .clone()
                .unwrap_or_else(|| "session finished".to_string());
            self.push_error(format!("read-only: {}", reason));
            return;
        }

        match action {
            KeyAction::Focus(delta) => {
                if let Some(id) = self.provider.neighbour_of_focus(delta) {
                    self.provider.select_single(&id);
                }
            }
            KeyAction::Extend(delta) => {
                if let Some(id) = self.provider.neighbour_of_focus(delta) {
                    self.provider.extend_to(&id);
                }
            }
            KeyAction::Toggle => {
                if let Some(id) = self.provider.selection().focused().cloned() {
                    self.provider.toggle(&id);
                }
            }
            KeyAction::SelectAll => self.provider.select_all(),
            KeyAction::Shift(direction) => {
                if !self.provider.shift_selection(direction) {
                    let edge = match direction {
                        VisualDirection::Up => "top",
                        VisualDirection::Down => "bottom",
                    };
                    self.push_info(format!("already at the {}", edge));
                }
            }
            KeyAction::MoveToBase => {
                if !self.provider.move_selection_to_base() {
                    self.push_info("already next to the base");
                }
            }
            KeyAction::SetAction(a) => self.set_action(a),
            KeyAction::ToggleOrder => {
                self.provider.toggle_order();
                let order = if self.provider.state().ascending {
                    "oldest first"
                } else {
                    "newest first"
                };
                self.push_info(order);
            }
            KeyAction::BeginSearch => {
                self.input.clear();
                self.mode = UiMode::Search;
            }
            KeyAction::SearchNext => match self.last_search.clone() {
                Some(query) => self.search(&query),
                None => self.push_info("no previous search"),
            },
            KeyAction::Start => self.finish(HostCommand::Start),
            KeyAction::Continue => self.finish(HostCommand::Continue),
            KeyAction::Skip => self.finish(HostCommand::Skip),
            KeyAction::Switch => self.finish(HostCommand::Switch),
            KeyAction::Abort => self.mode = UiMode::ConfirmAbort,
        }
    }

    fn set_action(&mut self, action: Action) {
        if self.provider.change_selected_actions(action) {
            return;
        }
        if action.is_squashing() {
            self.push_error(format!(
                "cannot {}: no earlier commit to fold into",
                action.as_str()
            ));
        } else {
            self.push_info(format!("nothing to mark as {}", action.as_str()));
        }
    }

    /// Focuses the next row after the focus whose text contains `query`
    /// (case-insensitive), wrapping around.
    pub(super) fn search(&mut self, query: &str) {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return;
        }
        self.last_search = Some(query.trim().to_string());

        let display = self.provider.display();
        let n = display.len();
        if n == 0 {
            return;
        }
        let start = self
            .provider
            .selection()
            .focused()
            .and_then(|id| display.index_of(id))
            .map(|i| i + 1)
            .unwrap_or(0);

        let hit = (0..n).map(|k| (start + k) % n).find_map(|i| {
            let entry = &display.get(i)?.entry;
            let text = entry
                .command_text
                .as_deref()
                .filter(|_| !entry.is_commit())
                .unwrap_or(&entry.message);
            let matches = text.to_lowercase().contains(&needle)
                || entry.sha.as_deref().is_some_and(|s| s.starts_with(&needle));
            matches.then(|| entry.id.clone())
        });

        match hit {
            Some(id) => {
                self.provider.select_single(&id);
                self.notice = None;
            }
            None => self.push_error(format!("no match for `{}`", query.trim())),
        }
    }

    /// Asks the host to hand the plan back to git.
    pub(super) fn finish(&mut self, command: HostCommand) {
        if self.pending.is_some() {
            return;
        }
        let name = command.name();
        let id = self
            .provider
            .sink_mut()
            .request(HostRequest::Command { command });
        self.pending = Some((id, name));
        self.push_info(format!("{}…", name.to_lowercase()));
    }

    pub(super) fn confirm_abort(&mut self, yes: bool) {
        self.mode = UiMode::Plan;
        if yes {
            self.finish(HostCommand::Abort);
        }
    }
}
