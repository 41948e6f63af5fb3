//! The authoritative side of an editing session.
//!
//! [`PlanHost`] owns the plan loaded from a `git-rebase-todo` file, applies
//! editor commands with the same operators the editor used optimistically,
//! answers with full snapshots, and writes the result back for git.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::ReplanConfig;
use crate::model::{BaseEntry, PlanState, PlanStatus};
use crate::plan::{apply_command, repair_orphans};
use crate::protocol::{FromHost, HostCommand, HostNotification, HostRequest, HostResponse, ToHost};
use crate::todo::{IdAllocator, parse_done, parse_todo, render_todo};
use crate::transport::HostEndpoint;

mod git;
mod serve;
pub use self::serve::serve_stdio;

#[derive(Clone, Debug, Default)]
pub struct HostOptions {
    pub ascending: bool,
    pub lookup_authors: bool,
    /// Author name -> avatar url, pushed after bootstrap.
    pub avatars: BTreeMap<String, String>,
    /// Where a changed sort order is remembered.
    pub config_path: Option<PathBuf>,
}

impl HostOptions {
    pub fn from_config(cfg: &ReplanConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            ascending: cfg.ascending,
            lookup_authors: cfg.lookup_authors,
            avatars: cfg.avatars.clone(),
            config_path,
        }
    }
}

pub struct PlanHost {
    state: PlanState,
    todo_path: PathBuf,
    options: HostOptions,
    selected_sha: Option<String>,
}

fn sibling(todo_path: &Path, name: &str) -> Option<PathBuf> {
    let path = todo_path.parent()?.join(name);
    path.is_file().then_some(path)
}

fn read_trimmed(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl PlanHost {
    pub fn new(state: PlanState, todo_path: PathBuf, options: HostOptions) -> Self {
        Self {
            state,
            todo_path,
            options,
            selected_sha: None,
        }
    }

    /// Loads the todo file and whatever git left next to it.
    ///
    /// `done` (present during `--edit-todo`) supplies the already-applied
    /// prefix and `onto` the base when the header comment is missing.
    pub fn open(todo_path: &Path, options: HostOptions) -> Result<Self> {
        let text = fs::read_to_string(todo_path)
            .with_context(|| format!("read todo file {}", todo_path.display()))?;

        let mut ids = IdAllocator::default();
        let done_entries = match sibling(todo_path, "done") {
            Some(path) => {
                let done = fs::read_to_string(&path)
                    .with_context(|| format!("read {}", path.display()))?;
                parse_done(&done, &mut ids)
            }
            None => Vec::new(),
        };
        let todo = parse_todo(&text, &mut ids);

        let read_only = if !todo.problems.is_empty() {
            Some(format!("git would reject this plan: {}", todo.problems.join("; ")))
        } else if todo.has_nonlinear_commands() {
            Some("plan rebases merges or updates refs; edit it as text instead".to_string())
        } else {
            None
        };

        let onto = todo
            .onto
            .clone()
            .or_else(|| sibling(todo_path, "onto").and_then(|p| read_trimmed(&p)));

        let mut entries = todo.entries;
        if read_only.is_none() {
            for change in repair_orphans(&mut entries) {
                warn!(id = %change.id, "squash without an earlier commit, loading as pick");
            }
        }

        let mut state = PlanState {
            entries,
            done_entries,
            base: None,
            ascending: options.ascending,
            status: PlanStatus::Editing,
            read_only,
            authors: BTreeMap::new(),
        };

        if let Some(sha) = onto {
            let message = if options.lookup_authors {
                git::commit_subject(&sha).unwrap_or_default()
            } else {
                String::new()
            };
            state.base = Some(BaseEntry { sha, message });
        }

        if options.lookup_authors {
            let shas: Vec<&str> = state
                .done_entries
                .iter()
                .chain(&state.entries)
                .filter_map(|e| e.sha.as_deref())
                .collect();
            state.authors = git::lookup_authors(&shas);
        }

        info!(
            todo = %todo_path.display(),
            entries = state.entries.len(),
            done = state.done_entries.len(),
            read_only = state.read_only.is_some(),
            "opened plan"
        );
        Ok(Self::new(state, todo_path.to_path_buf(), options))
    }

    pub fn state(&self) -> &PlanState {
        &self.state
    }

    pub fn todo_path(&self) -> &Path {
        &self.todo_path
    }

    pub fn selected_sha(&self) -> Option<&str> {
        self.selected_sha.as_deref()
    }

    pub fn did_change(&self) -> HostNotification {
        HostNotification::DidChange {
            state: self.state.clone(),
        }
    }

    pub fn avatars_notification(&self) -> Option<HostNotification> {
        if self.options.avatars.is_empty() {
            return None;
        }
        Some(HostNotification::DidChangeAvatars {
            avatars: self.options.avatars.clone(),
        })
    }

    fn write_todo(&self, text: &str) -> Result<()> {
        fs::write(&self.todo_path, text)
            .with_context(|| format!("write todo file {}", self.todo_path.display()))
    }

    fn finish(&mut self, status: PlanStatus) -> Result<bool> {
        if self.state.status.is_finished() {
            debug!(current = ?self.state.status, requested = ?status, "session already finished");
            return Ok(false);
        }
        match status {
            // An empty todo makes git abort the rebase.
            PlanStatus::Aborted => self.write_todo("")?,
            // Read-only plans are handed back exactly as git wrote them.
            _ if self.state.is_read_only() => {}
            _ => self.write_todo(&render_todo(&self.state.entries))?,
        }
        self.state.status = status;
        info!(status = ?status, todo = %self.todo_path.display(), "session finished");
        Ok(true)
    }

    fn remember_order(&self, ascending: bool) {
        let Some(path) = &self.options.config_path else {
            return;
        };
        let result = ReplanConfig::load(Some(path)).and_then(|mut cfg| {
            cfg.ascending = ascending;
            cfg.save(path)
        });
        if let Err(err) = result {
            warn!(error = %format!("{:#}", err), "could not remember sort order");
        }
    }

    /// Applies one command; returns whether the plan snapshot changed.
    pub fn handle_command(&mut self, command: &HostCommand) -> Result<bool> {
        debug!(command = command.name(), "host command");
        if let Some(status) = command.finishing_status() {
            return self.finish(status);
        }
        match command {
            HostCommand::UpdateSelection { sha } => {
                self.selected_sha = sha.clone();
                Ok(false)
            }
            HostCommand::Search | HostCommand::Recompose => {
                info!(command = command.name(), "not available in this host; ignored");
                Ok(false)
            }
            HostCommand::Reorder { ascending } => {
                let changed = apply_command(&mut self.state, command);
                if changed {
                    self.remember_order(*ascending);
                }
                Ok(changed)
            }
            _ => {
                let changed = apply_command(&mut self.state, command);
                if !changed {
                    debug!(command = command.name(), "command left the plan unchanged");
                }
                Ok(changed)
            }
        }
    }

    /// Answers a request, reporting whether the plan snapshot changed.
    pub fn handle_request(&mut self, request: &HostRequest) -> Result<(HostResponse, bool)> {
        match request {
            HostRequest::Bootstrap => Ok((
                HostResponse::State {
                    state: self.state.clone(),
                },
                false,
            )),
            HostRequest::Command { command } => {
                if command.finishing_status().is_some() && self.state.status.is_finished() {
                    let reason = format!("session already {:?}", self.state.status).to_lowercase();
                    return Ok((HostResponse::Rejected { reason }, false));
                }
                let changed = self.handle_command(command)?;
                Ok((
                    HostResponse::Ack {
                        status: self.state.status,
                    },
                    changed,
                ))
            }
        }
    }

    /// Handles one inbound message and returns what to send back.
    ///
    /// Failures are reported (as a rejection for requests) and never end the
    /// session.
    pub fn dispatch(&mut self, msg: ToHost) -> Vec<FromHost> {
        let mut out = Vec::new();
        match msg {
            ToHost::Command { command } => match self.handle_command(&command) {
                Ok(true) => out.push(FromHost::Notification {
                    notification: self.did_change(),
                }),
                Ok(false) => {}
                Err(err) => {
                    warn!(command = command.name(), error = %format!("{:#}", err), "command failed");
                }
            },
            ToHost::Request { id, request } => {
                let response = match self.handle_request(&request) {
                    Ok((response, changed)) => {
                        if changed {
                            out.push(FromHost::Notification {
                                notification: self.did_change(),
                            });
                        }
                        response
                    }
                    Err(err) => HostResponse::Rejected {
                        reason: format!("{:#}", err),
                    },
                };
                out.push(FromHost::Response { id, response });
            }
        }
        out
    }
}

/// Serves an in-process editor until it hangs up or the session finishes.
pub async fn run_host(mut host: PlanHost, mut endpoint: HostEndpoint) -> Result<PlanHost> {
    if let Some(notification) = host.avatars_notification() {
        let _ = endpoint.outbox.send(FromHost::Notification { notification });
    }
    while let Some(msg) = endpoint.inbox.recv().await {
        for reply in host.dispatch(msg) {
            if endpoint.outbox.send(reply).is_err() {
                debug!("editor disconnected");
                return Ok(host);
            }
        }
        if host.state().status.is_finished() {
            break;
        }
    }
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, EntryId};

    const TODO: &str = "\
pick aaaaaaa First
pick bbbbbbb Second
squash ccccccc Third

# Rebase 0000000..ccccccc onto 0000000 (3 commands)
";

    fn open(dir: &Path, text: &str) -> Result<PlanHost> {
        let path = dir.join("git-rebase-todo");
        fs::write(&path, text)?;
        PlanHost::open(&path, HostOptions::default())
    }

    #[test]
    fn opens_todo_with_base_from_header() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let host = open(dir.path(), TODO)?;
        assert_eq!(host.state().entries.len(), 3);
        assert_eq!(
            host.state().base.as_ref().map(|b| b.sha.as_str()),
            Some("0000000")
        );
        assert!(!host.state().is_read_only());
        Ok(())
    }

    #[test]
    fn done_and_onto_files_are_picked_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("done"), "pick 1111111 Applied\n")?;
        fs::write(dir.path().join("onto"), "9999999999\n")?;
        let host = open(dir.path(), "pick aaaaaaa First\n")?;
        assert_eq!(host.state().done_entries.len(), 1);
        assert!(host.state().done_entries[0].done);
        assert_eq!(
            host.state().base.as_ref().map(|b| b.sha.as_str()),
            Some("9999999999")
        );
        Ok(())
    }

    #[test]
    fn merges_make_the_plan_read_only() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut host = open(dir.path(), "label onto\npick aaaaaaa A\nmerge -C bbbbbbb topic\n")?;
        assert!(host.state().is_read_only());
        let drop = HostCommand::ChangeEntry {
            id: EntryId::from("aaaaaaa"),
            action: Action::Drop,
        };
        assert!(!host.handle_command(&drop)?);
        Ok(())
    }

    #[test]
    fn leading_fixup_loads_as_pick() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut host = open(dir.path(), "fixup aaaaaaa A\npick bbbbbbb B\n")?;
        let actions: Vec<Action> = host.state().entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![Action::Pick, Action::Pick]);
        assert!(!host.state().is_read_only());

        host.handle_command(&HostCommand::Start)?;
        assert_eq!(
            fs::read_to_string(host.todo_path())?,
            "pick aaaaaaa A\npick bbbbbbb B\n"
        );
        Ok(())
    }

    #[test]
    fn selection_updates_are_remembered() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut host = open(dir.path(), TODO)?;
        let changed = host.handle_command(&HostCommand::UpdateSelection {
            sha: Some("bbbbbbb".to_string()),
        })?;
        assert!(!changed);
        assert_eq!(host.selected_sha(), Some("bbbbbbb"));
        Ok(())
    }

    #[test]
    fn dropping_the_target_repairs_the_squash() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut host = open(dir.path(), "pick aaaaaaa A\nsquash bbbbbbb B\n")?;
        let out = host.dispatch(ToHost::Command {
            command: HostCommand::ChangeEntry {
                id: EntryId::from("aaaaaaa"),
                action: Action::Drop,
            },
        });
        assert_eq!(out.len(), 1);
        let actions: Vec<Action> = host.state().entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![Action::Drop, Action::Pick]);
        Ok(())
    }

    #[test]
    fn start_writes_the_todo_and_abort_empties_it() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut host = open(dir.path(), TODO)?;
        host.handle_command(&HostCommand::MoveEntry {
            id: EntryId::from("ccccccc"),
            to: 0,
            relative: false,
        })?;
        assert!(host.handle_command(&HostCommand::Start)?);
        let written = fs::read_to_string(host.todo_path())?;
        assert_eq!(
            written,
            "pick ccccccc Third\npick aaaaaaa First\npick bbbbbbb Second\n"
        );
        assert!(!host.handle_command(&HostCommand::Abort)?);

        let mut host = open(dir.path(), TODO)?;
        assert!(host.handle_command(&HostCommand::Abort)?);
        assert_eq!(fs::read_to_string(host.todo_path())?, "");
        assert_eq!(host.state().status, PlanStatus::Aborted);
        Ok(())
    }

    #[test]
    fn second_finish_request_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut host = open(dir.path(), TODO)?;
        let start = HostRequest::Command {
            command: HostCommand::Start,
        };
        let (first, changed) = host.handle_request(&start)?;
        assert!(changed);
        assert_eq!(
            first,
            HostResponse::Ack {
                status: PlanStatus::Started
            }
        );
        let (second, _) = host.handle_request(&start)?;
        assert!(matches!(second, HostResponse::Rejected { .. }));
        Ok(())
    }

    #[test]
    fn reorder_is_remembered_in_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = dir.path().join("config.json");
        let path = dir.path().join("git-rebase-todo");
        fs::write(&path, TODO)?;
        let opts = HostOptions {
            config_path: Some(cfg.clone()),
            ..HostOptions::default()
        };
        let mut host = PlanHost::open(&path, opts)?;
        assert!(host.handle_command(&HostCommand::Reorder { ascending: true })?);
        assert!(ReplanConfig::load(Some(&cfg))?.ascending);
        Ok(())
    }
}
