use crate::model::{ActionChange, PlanState};
use crate::protocol::HostCommand;

use super::moves::{index_of, move_entries, move_entry, relative_target, shift_entries};
use super::squash::{apply_changes, plan_action_changes, repair_orphans};

/// Applies a plan-editing command to `state`, returning whether it changed.
///
/// The engine (optimistically) and the host (authoritatively) both go
/// through here, so the same command yields the same plan on both sides.
/// Reorders also repair squash/fixup entries that lost their target.
/// Lifecycle commands are not handled here and report no change.
pub fn apply_command(state: &mut PlanState, command: &HostCommand) -> bool {
    if command.is_mutation() && (state.is_read_only() || state.status.is_finished()) {
        return false;
    }

    let entries = &mut state.entries;
    match command {
        HostCommand::MoveEntry { id, to, relative } => {
            let Some(from) = index_of(entries, id) else {
                return false;
            };
            let to = if *relative {
                relative_target(entries.len(), from, *to)
            } else {
                usize::try_from(*to).ok()
            };
            let Some(to) = to else {
                return false;
            };
            if !move_entry(entries, from, to) {
                return false;
            }
            repair_orphans(entries);
            true
        }
        HostCommand::MoveEntries { ids, to } => {
            if !move_entries(entries, ids, *to) {
                return false;
            }
            repair_orphans(entries);
            true
        }
        HostCommand::ShiftEntries { ids, direction } => {
            if !shift_entries(entries, ids, *direction) {
                return false;
            }
            repair_orphans(entries);
            true
        }
        HostCommand::ChangeEntry { id, action } => {
            let requested = [ActionChange {
                id: id.clone(),
                action: *action,
            }];
            let batch = plan_action_changes(entries, &requested);
            apply_changes(entries, &batch)
        }
        HostCommand::ChangeEntries { changes } => {
            let batch = plan_action_changes(entries, changes);
            apply_changes(entries, &batch)
        }
        HostCommand::Reorder { ascending } => {
            if state.ascending == *ascending {
                return false;
            }
            state.ascending = *ascending;
            true
        }
        _ => false,
    }
}
