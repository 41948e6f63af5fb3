//! Messages exchanged between the editing engine and the authoritative host.
//!
//! Commands are fire-and-forget. A few exchanges need a reply and travel as
//! requests correlated by [`RequestId`]. The host answers every
//! state-changing command with a full [`HostNotification::DidChange`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Action, ActionChange, EntryId, PlanState, PlanStatus};
use crate::plan::ShiftDirection;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostCommand {
    /// `relative` makes `to` a signed offset from the entry's current index.
    MoveEntry {
        id: EntryId,
        to: i64,
        #[serde(default)]
        relative: bool,
    },
    MoveEntries {
        ids: Vec<EntryId>,
        to: usize,
    },
    ShiftEntries {
        ids: Vec<EntryId>,
        direction: ShiftDirection,
    },
    ChangeEntry {
        id: EntryId,
        action: Action,
    },
    ChangeEntries {
        changes: Vec<ActionChange>,
    },
    Reorder {
        ascending: bool,
    },
    UpdateSelection {
        #[serde(default)]
        sha: Option<String>,
    },
    Start,
    Continue,
    Skip,
    Abort,
    Switch,
    Search,
    Recompose,
}

impl HostCommand {
    pub fn name(&self) -> &'static str {
        match self {
            HostCommand::MoveEntry { .. } => "MoveEntry",
            HostCommand::MoveEntries { .. } => "MoveEntries",
            HostCommand::ShiftEntries { .. } => "ShiftEntries",
            HostCommand::ChangeEntry { .. } => "ChangeEntry",
            HostCommand::ChangeEntries { .. } => "ChangeEntries",
            HostCommand::Reorder { .. } => "Reorder",
            HostCommand::UpdateSelection { .. } => "UpdateSelection",
            HostCommand::Start => "Start",
            HostCommand::Continue => "Continue",
            HostCommand::Skip => "Skip",
            HostCommand::Abort => "Abort",
            HostCommand::Switch => "Switch",
            HostCommand::Search => "Search",
            HostCommand::Recompose => "Recompose",
        }
    }

    /// Commands that hand the plan back to git and end the session.
    pub fn finishing_status(&self) -> Option<PlanStatus> {
        match self {
            HostCommand::Start => Some(PlanStatus::Started),
            HostCommand::Continue => Some(PlanStatus::Continued),
            HostCommand::Skip => Some(PlanStatus::Skipped),
            HostCommand::Abort => Some(PlanStatus::Aborted),
            HostCommand::Switch => Some(PlanStatus::Switched),
            _ => None,
        }
    }

    /// Commands that edit the plan (and are refused on read-only plans).
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            HostCommand::MoveEntry { .. }
                | HostCommand::MoveEntries { .. }
                | HostCommand::ShiftEntries { .. }
                | HostCommand::ChangeEntry { .. }
                | HostCommand::ChangeEntries { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostNotification {
    DidChange {
        state: PlanState,
    },
    /// Author name -> avatar url.
    DidChangeAvatars {
        avatars: BTreeMap<String, String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostRequest {
    /// Initial snapshot for a freshly opened editor.
    Bootstrap,
    /// Any command, acknowledged once the host has applied it.
    Command { command: HostCommand },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostResponse {
    State { state: PlanState },
    Ack { status: PlanStatus },
    Rejected { reason: String },
}

/// Envelope for everything flowing toward the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToHost {
    Command {
        command: HostCommand,
    },
    Request {
        id: RequestId,
        request: HostRequest,
    },
}

/// Envelope for everything flowing back from the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FromHost {
    Notification {
        notification: HostNotification,
    },
    Response {
        id: RequestId,
        response: HostResponse,
    },
}
