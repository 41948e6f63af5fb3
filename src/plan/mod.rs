//! The plan editing engine: ordering, selection, squash rules and the
//! optimistic state provider. Nothing in here performs I/O.

mod apply;
mod display;
mod flags;
mod moves;
mod provider;
mod selection;
mod squash;

pub use self::apply::apply_command;
pub use self::display::{DisplayOrder, DisplayRow, DropPosition, RowRole};
pub use self::flags::{EntryFlags, derive_flags};
pub use self::moves::{
    ShiftDirection, batch_resting_index, index_of, move_entries, move_entry, relative_target,
    shift_entries,
};
pub use self::provider::{CommandSink, PlanProvider, VisualDirection};
pub use self::selection::Selection;
pub use self::squash::{
    SquashInfo, apply_changes, can_assign, oldest_commit_index, plan_action_changes,
    repair_orphans, squash_target,
};
