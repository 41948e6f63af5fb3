//! Squash/fixup chain rules.
//!
//! A squash or fixup folds its commit into the nearest earlier commit that
//! survives on its own (pick, reword or edit). Dropped commits, other
//! squashes and standalone commands are skipped by that backward scan.

use std::collections::HashSet;

use crate::model::{Action, ActionChange, Entry, EntryId};

/// Index of the first commit entry; it has nothing earlier to fold into.
pub fn oldest_commit_index(entries: &[Entry]) -> Option<usize> {
    entries.iter().position(Entry::is_commit)
}

/// Backward scan from `index` for the commit a squash/fixup would merge into.
pub fn squash_target(entries: &[Entry], index: usize) -> Option<usize> {
    entries[..index.min(entries.len())]
        .iter()
        .rposition(|e| e.is_commit() && e.action.is_squash_target())
}

fn is_orphaned(entries: &[Entry], index: usize) -> bool {
    let e = &entries[index];
    e.is_commit() && e.action.is_squashing() && squash_target(entries, index).is_none()
}

/// Whether `action` may be assigned to the entry at `index`.
pub fn can_assign(entries: &[Entry], index: usize, action: Action) -> bool {
    let Some(entry) = entries.get(index) else {
        return false;
    };
    if entry.is_commit() != action.is_commit_action() {
        return false;
    }
    if action.is_squashing() {
        if oldest_commit_index(entries) == Some(index) {
            return false;
        }
        return squash_target(entries, index).is_some();
    }
    true
}

/// Turns every squash/fixup left without a target into a pick, returning
/// the reassignments made.
pub fn repair_orphans(entries: &mut [Entry]) -> Vec<ActionChange> {
    let mut repaired = Vec::new();
    for i in 0..entries.len() {
        if is_orphaned(entries, i) {
            entries[i].action = Action::Pick;
            repaired.push(ActionChange {
                id: entries[i].id.clone(),
                action: Action::Pick,
            });
        }
    }
    repaired
}

/// Validates a batch of requested action changes against the plan.
///
/// Changes are checked in order against a working copy, so later requests
/// see earlier ones. Rejected changes are left out. When anything was
/// dropped, orphaned squash/fixup entries are reassigned `pick` and appended
/// to the batch. The returned batch is what should be applied.
pub fn plan_action_changes(entries: &[Entry], requested: &[ActionChange]) -> Vec<ActionChange> {
    let mut working = entries.to_vec();
    let mut accepted = Vec::new();
    let mut dropped_any = false;

    for change in requested {
        let Some(i) = working.iter().position(|e| e.id == change.id) else {
            continue;
        };
        if working[i].action == change.action || !can_assign(&working, i, change.action) {
            continue;
        }
        working[i].action = change.action;
        dropped_any |= change.action == Action::Drop;
        accepted.push(change.clone());
    }

    if dropped_any {
        for repair in repair_orphans(&mut working) {
            match accepted.iter_mut().find(|c| c.id == repair.id) {
                Some(existing) => existing.action = repair.action,
                None => accepted.push(repair),
            }
        }
    }

    accepted
}

pub fn apply_changes(entries: &mut [Entry], changes: &[ActionChange]) -> bool {
    let mut changed = false;
    for change in changes {
        if let Some(e) = entries.iter_mut().find(|e| e.id == change.id)
            && e.action != change.action
        {
            e.action = change.action;
            changed = true;
        }
    }
    changed
}

/// Squash relationships used to draw chains.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SquashInfo {
    /// Commits that absorb at least one squash/fixup.
    pub targets: HashSet<EntryId>,
    /// Squash/fixup entries that have a target.
    pub squashing: HashSet<EntryId>,
    /// Commands sitting between a squash/fixup and its target.
    pub commands_in_run: HashSet<EntryId>,
}

impl SquashInfo {
    pub fn compute(entries: &[Entry]) -> Self {
        let mut info = Self::default();

        for (i, entry) in entries.iter().enumerate() {
            if !(entry.is_commit() && entry.action.is_squashing()) {
                continue;
            }
            let mut commands = Vec::new();
            for candidate in entries[..i].iter().rev() {
                if !candidate.is_commit() {
                    commands.push(candidate.id.clone());
                    continue;
                }
                if candidate.action.is_squash_target() {
                    info.targets.insert(candidate.id.clone());
                    info.squashing.insert(entry.id.clone());
                    info.commands_in_run.extend(commands);
                    break;
                }
            }
        }

        info
    }

    pub fn is_target(&self, id: &EntryId) -> bool {
        self.targets.contains(id)
    }

    pub fn is_squashing(&self, id: &EntryId) -> bool {
        self.squashing.contains(id) || self.commands_in_run.contains(id)
    }
}
