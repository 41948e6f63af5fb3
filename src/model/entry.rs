use serde::{Deserialize, Serialize};

use super::ids::EntryId;

fn is_false(v: &bool) -> bool {
    !*v
}

/// What a plan step does when the rebase runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Pick,
    Reword,
    Edit,
    Squash,
    Fixup,
    Drop,
    Exec,
    Break,
    Noop,
    Label,
    Reset,
    Merge,
    UpdateRef,
}

impl Action {
    pub const COMMIT_ACTIONS: [Action; 6] = [
        Action::Pick,
        Action::Reword,
        Action::Edit,
        Action::Squash,
        Action::Fixup,
        Action::Drop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Pick => "pick",
            Action::Reword => "reword",
            Action::Edit => "edit",
            Action::Squash => "squash",
            Action::Fixup => "fixup",
            Action::Drop => "drop",
            Action::Exec => "exec",
            Action::Break => "break",
            Action::Noop => "noop",
            Action::Label => "label",
            Action::Reset => "reset",
            Action::Merge => "merge",
            Action::UpdateRef => "update-ref",
        }
    }

    /// Parses a todo verb, long or abbreviated.
    pub fn parse(verb: &str) -> Option<Self> {
        let action = match verb {
            "pick" | "p" => Action::Pick,
            "reword" | "r" => Action::Reword,
            "edit" | "e" => Action::Edit,
            "squash" | "s" => Action::Squash,
            "fixup" | "f" => Action::Fixup,
            "drop" | "d" => Action::Drop,
            "exec" | "x" => Action::Exec,
            "break" | "b" => Action::Break,
            "noop" => Action::Noop,
            "label" | "l" => Action::Label,
            "reset" | "t" => Action::Reset,
            "merge" | "m" => Action::Merge,
            "update-ref" | "u" => Action::UpdateRef,
            _ => return None,
        };
        Some(action)
    }

    /// Actions that apply to a commit (as opposed to standalone commands).
    pub fn is_commit_action(self) -> bool {
        Self::COMMIT_ACTIONS.contains(&self)
    }

    /// Squash and fixup fold a commit into an earlier one.
    pub fn is_squashing(self) -> bool {
        matches!(self, Action::Squash | Action::Fixup)
    }

    /// A commit with this action can absorb a following squash/fixup.
    pub fn is_squash_target(self) -> bool {
        matches!(self, Action::Pick | Action::Reword | Action::Edit)
    }

    /// Commands that only make sense in non-linear (merge-preserving) plans.
    pub fn is_nonlinear(self) -> bool {
        matches!(
            self,
            Action::Label | Action::Reset | Action::Merge | Action::UpdateRef
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Commit,
    Command,
}

/// One step of a rebase plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub action: Action,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,

    #[serde(default)]
    pub message: String,

    /// Argument of exec-style commands (and `fixup -C` style flags).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_text: Option<String>,

    /// Already applied by an in-progress rebase.
    #[serde(default, skip_serializing_if = "is_false")]
    pub done: bool,
}

impl Entry {
    pub fn commit(
        id: impl Into<EntryId>,
        action: Action,
        sha: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: EntryKind::Commit,
            action,
            sha: Some(sha.into()),
            message: message.into(),
            command_text: None,
            done: false,
        }
    }

    pub fn command(id: impl Into<EntryId>, action: Action, command_text: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind: EntryKind::Command,
            action,
            sha: None,
            message: String::new(),
            command_text,
            done: false,
        }
    }

    pub fn is_commit(&self) -> bool {
        self.kind == EntryKind::Commit
    }

    pub fn short_sha(&self) -> &str {
        match &self.sha {
            Some(sha) => sha.get(..7).unwrap_or(sha),
            None => "",
        }
    }
}

/// Requested or derived action reassignment for one entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChange {
    pub id: EntryId,
    pub action: Action,
}

/// The commit the plan is built upon. Shown, never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEntry {
    pub sha: String,
    #[serde(default)]
    pub message: String,
}

impl BaseEntry {
    pub fn id(&self) -> EntryId {
        EntryId::new(self.sha.clone())
    }

    pub fn to_entry(&self) -> Entry {
        Entry::commit(self.id(), Action::Pick, self.sha.clone(), self.message.clone())
    }
}
