use serde::Serialize;

use crate::model::EntryId;

use super::display::{DisplayOrder, RowRole};
use super::selection::Selection;
use super::squash::SquashInfo;

/// Per-row facts the renderer needs, derived once per mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFlags {
    pub is_base: bool,
    pub is_done: bool,
    /// The last applied entry: where an in-progress rebase stopped.
    pub is_current: bool,
    pub is_oldest: bool,
    pub is_squash_target: bool,
    pub is_squashing: bool,
    pub is_selected: bool,
    pub is_focused: bool,
}

/// Flags for every display row, index-aligned with `display.rows()`.
pub fn derive_flags(
    display: &DisplayOrder,
    squash: &SquashInfo,
    oldest: Option<&EntryId>,
    current: Option<&EntryId>,
    selection: &Selection,
) -> Vec<EntryFlags> {
    display
        .rows()
        .iter()
        .map(|row| {
            let id = &row.entry.id;
            let editable = row.role == RowRole::Editable;
            EntryFlags {
                is_base: row.role == RowRole::Base,
                is_done: row.role == RowRole::Done,
                is_current: current == Some(id),
                is_oldest: editable && oldest == Some(id),
                is_squash_target: editable && squash.is_target(id),
                is_squashing: editable && squash.is_squashing(id),
                is_selected: selection.is_selected(id),
                is_focused: selection.focused() == Some(id),
            }
        })
        .collect()
}
