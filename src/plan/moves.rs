//! Reordering operators over the canonical plan.
//!
//! Every operator works on canonical indices, reports whether the order
//! changed, and treats out-of-range input as a no-op.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Entry, EntryId};

/// Canonical direction: `Up` moves toward index 0 (older).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftDirection {
    Up,
    Down,
}

impl ShiftDirection {
    pub fn flipped(self) -> Self {
        match self {
            ShiftDirection::Up => ShiftDirection::Down,
            ShiftDirection::Down => ShiftDirection::Up,
        }
    }
}

pub fn index_of(entries: &[Entry], id: &EntryId) -> Option<usize> {
    entries.iter().position(|e| &e.id == id)
}

/// Moves one entry so that it rests at `to`. `to == len` appends.
pub fn move_entry(entries: &mut Vec<Entry>, from: usize, to: usize) -> bool {
    let len = entries.len();
    if from >= len || to > len {
        return false;
    }
    let to = to.min(len - 1);
    if from == to {
        return false;
    }
    let entry = entries.remove(from);
    entries.insert(to, entry);
    true
}

/// Resolves a signed offset from `from` to a resting index, if in range.
pub fn relative_target(len: usize, from: usize, offset: i64) -> Option<usize> {
    let to = i64::try_from(from).ok()?.checked_add(offset)?;
    let to = usize::try_from(to).ok()?;
    (to < len).then_some(to)
}

/// Converts a pre-removal insertion point into the resting index of the
/// first moved entry: every selected entry sitting before the insertion
/// point frees one slot once removed.
pub fn batch_resting_index(entries: &[Entry], ids: &[EntryId], insertion: usize) -> usize {
    let selected: HashSet<&EntryId> = ids.iter().collect();
    let insertion = insertion.min(entries.len());
    let before = entries[..insertion]
        .iter()
        .filter(|e| selected.contains(&e.id))
        .count();
    insertion - before
}

/// Lifts every entry named in `ids` out of the plan, keeping their current
/// relative order, and reinserts them as one block whose first entry rests
/// at `to` (clamped so the block fits). Unknown ids are ignored.
pub fn move_entries(entries: &mut Vec<Entry>, ids: &[EntryId], to: usize) -> bool {
    let selected: HashSet<&EntryId> = ids.iter().collect();
    if !entries.iter().any(|e| selected.contains(&e.id)) {
        return false;
    }

    let before: Vec<EntryId> = entries.iter().map(|e| e.id.clone()).collect();
    let (moved, mut rest): (Vec<Entry>, Vec<Entry>) = std::mem::take(entries)
        .into_iter()
        .partition(|e| selected.contains(&e.id));

    let at = to.min(rest.len());
    let tail = rest.split_off(at);
    rest.extend(moved);
    rest.extend(tail);
    *entries = rest;

    entries.iter().map(|e| &e.id).ne(before.iter())
}

/// Swaps each selected entry with its unselected neighbour in `direction`.
///
/// Scanning from the leading edge lets a contiguous run move one step as a
/// unit; a run already at the edge stays put.
pub fn shift_entries(entries: &mut [Entry], ids: &[EntryId], direction: ShiftDirection) -> bool {
    let wanted: HashSet<&EntryId> = ids.iter().collect();
    let mut selected: Vec<bool> = entries.iter().map(|e| wanted.contains(&e.id)).collect();
    let len = entries.len();
    let mut changed = false;

    match direction {
        ShiftDirection::Up => {
            for i in 1..len {
                if selected[i] && !selected[i - 1] {
                    entries.swap(i, i - 1);
                    selected.swap(i, i - 1);
                    changed = true;
                }
            }
        }
        ShiftDirection::Down => {
            for i in (0..len.saturating_sub(1)).rev() {
                if selected[i] && !selected[i + 1] {
                    entries.swap(i, i + 1);
                    selected.swap(i, i + 1);
                    changed = true;
                }
            }
        }
    }

    changed
}
