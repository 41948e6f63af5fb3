use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entry::{BaseEntry, Entry};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Editing,
    Started,
    Aborted,
    Continued,
    Skipped,
    Switched,
}

impl PlanStatus {
    /// The session is over once the plan has been handed back to git.
    pub fn is_finished(self) -> bool {
        self != PlanStatus::Editing
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Full authoritative snapshot pushed by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanState {
    pub entries: Vec<Entry>,

    #[serde(default)]
    pub done_entries: Vec<Entry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<BaseEntry>,

    #[serde(default)]
    pub ascending: bool,

    #[serde(default)]
    pub status: PlanStatus,

    /// Set when the host cannot let this plan be edited (e.g. merges).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<String>,

    /// Commit sha -> author.
    #[serde(default)]
    pub authors: BTreeMap<String, Author>,
}

impl PlanState {
    pub fn is_read_only(&self) -> bool {
        self.read_only.is_some()
    }
}
