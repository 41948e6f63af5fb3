//! Presentation ordering derived from the canonical plan.
//!
//! The canonical order is oldest-first. Display order optionally reverses it
//! (newest first) and surrounds it with rows that cannot be edited: the base
//! commit and entries an in-progress rebase already applied. Everything here
//! is a pure recomputation; callers rebuild after every mutation.

use std::collections::HashMap;

use crate::model::{BaseEntry, Entry, EntryId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowRole {
    Base,
    Done,
    Editable,
}

impl RowRole {
    pub fn is_editable(self) -> bool {
        self == RowRole::Editable
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayRow {
    pub entry: Entry,
    pub role: RowRole,
}

/// Where a dragged row lands relative to the row under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
}

#[derive(Clone, Debug, Default)]
pub struct DisplayOrder {
    rows: Vec<DisplayRow>,
    index: HashMap<EntryId, usize>,
    ascending: bool,
    non_editable: usize,
    editable: usize,
}

impl DisplayOrder {
    pub fn build(
        entries: &[Entry],
        done: &[Entry],
        base: Option<&BaseEntry>,
        ascending: bool,
    ) -> Self {
        let mut rows = Vec::with_capacity(entries.len() + done.len() + 1);

        if let Some(base) = base {
            let id = base.id();
            let included = done.iter().chain(entries).any(|e| e.id == id);
            if !included {
                rows.push(DisplayRow {
                    entry: base.to_entry(),
                    role: RowRole::Base,
                });
            }
        }
        rows.extend(done.iter().map(|e| DisplayRow {
            entry: e.clone(),
            role: RowRole::Done,
        }));
        let non_editable = rows.len();
        rows.extend(entries.iter().map(|e| DisplayRow {
            entry: e.clone(),
            role: RowRole::Editable,
        }));

        if !ascending {
            rows.reverse();
        }

        let index = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.entry.id.clone(), i))
            .collect();

        Self {
            rows,
            index,
            ascending,
            non_editable,
            editable: entries.len(),
        }
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn get(&self, display: usize) -> Option<&DisplayRow> {
        self.rows.get(display)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    /// Base row (if shown) plus done entries.
    pub fn non_editable_count(&self) -> usize {
        self.non_editable
    }

    pub fn editable_len(&self) -> usize {
        self.editable
    }

    /// Display index of the first editable row.
    ///
    /// Descending order pushes the non-editable rows to the tail, so the
    /// editable block starts at zero there.
    pub fn offset(&self) -> usize {
        if self.ascending { self.non_editable } else { 0 }
    }

    pub fn index_of(&self, id: &EntryId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.index.contains_key(id)
    }

    pub fn role_of(&self, id: &EntryId) -> Option<RowRole> {
        self.index_of(id).map(|i| self.rows[i].role)
    }

    pub fn is_base(&self, id: &EntryId) -> bool {
        self.role_of(id) == Some(RowRole::Base)
    }

    pub fn to_canonical(&self, display: usize) -> Option<usize> {
        if self.ascending {
            display
                .checked_sub(self.non_editable)
                .filter(|&c| c < self.editable)
        } else if display < self.editable {
            Some(self.editable - 1 - display)
        } else {
            None
        }
    }

    pub fn to_display(&self, canonical: usize) -> Option<usize> {
        if canonical >= self.editable {
            return None;
        }
        if self.ascending {
            Some(canonical + self.non_editable)
        } else {
            Some(self.editable - 1 - canonical)
        }
    }

    pub fn canonical_index_of(&self, id: &EntryId) -> Option<usize> {
        self.index_of(id).and_then(|d| self.to_canonical(d))
    }

    /// Canonical insertion point (`0..=editable_len`, before removal) for a
    /// drop next to `target_display`. Rows outside the editable block mean
    /// "onto the base", which is insertion point 0.
    pub fn insertion_point(&self, target_display: usize, position: DropPosition) -> Option<usize> {
        if target_display >= self.rows.len() {
            return None;
        }
        let Some(target) = self.to_canonical(target_display) else {
            return Some(0);
        };
        // "After" in an ascending list is later in the plan; a descending
        // list flips that.
        let later = match position {
            DropPosition::After => self.ascending,
            DropPosition::Before => !self.ascending,
        };
        Some(if later { target + 1 } else { target })
    }

    /// Resolves a single-row drop to `(from, to)` canonical indices, where
    /// `to` is the literal resting index. Returns `None` when the drop would
    /// leave the row where it is.
    pub fn resolve_drop(
        &self,
        id: &EntryId,
        target_display: usize,
        position: DropPosition,
    ) -> Option<(usize, usize)> {
        let from = self.canonical_index_of(id)?;
        let insertion = self.insertion_point(target_display, position)?;
        if insertion == from || insertion == from + 1 {
            return None;
        }
        let to = if insertion > from {
            insertion - 1
        } else {
            insertion
        };
        Some((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Action;

    fn commits(ids: &[&str]) -> Vec<Entry> {
        ids.iter()
            .map(|id| Entry::commit(*id, Action::Pick, *id, format!("msg {id}")))
            .collect()
    }

    fn base() -> BaseEntry {
        BaseEntry {
            sha: "X".to_string(),
            message: "base".to_string(),
        }
    }

    fn ids(order: &DisplayOrder) -> Vec<&str> {
        order.rows().iter().map(|r| r.entry.id.as_str()).collect()
    }

    #[test]
    fn descending_puts_base_last_and_ascending_first() {
        let entries = commits(&["A", "B", "C"]);
        let b = base();

        let desc = DisplayOrder::build(&entries, &[], Some(&b), false);
        assert_eq!(ids(&desc), vec!["C", "B", "A", "X"]);
        assert_eq!(desc.offset(), 0);

        let asc = DisplayOrder::build(&entries, &[], Some(&b), true);
        assert_eq!(ids(&asc), vec!["X", "A", "B", "C"]);
        assert_eq!(asc.offset(), 1);

        // Presentation never touches the canonical slice.
        assert_eq!(
            entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn done_entries_sit_between_base_and_plan() {
        let entries = commits(&["C", "D"]);
        let mut done = commits(&["A", "B"]);
        for e in &mut done {
            e.done = true;
        }
        let b = base();
        let asc = DisplayOrder::build(&entries, &done, Some(&b), true);
        assert_eq!(ids(&asc), vec!["X", "A", "B", "C", "D"]);
        assert_eq!(asc.non_editable_count(), 3);
        assert_eq!(asc.to_canonical(3), Some(0));
        assert_eq!(asc.to_canonical(2), None);

        let desc = DisplayOrder::build(&entries, &done, Some(&b), false);
        assert_eq!(ids(&desc), vec!["D", "C", "B", "A", "X"]);
        assert_eq!(desc.to_canonical(0), Some(1));
        assert_eq!(desc.to_canonical(2), None);
        assert_eq!(desc.len(), entries.len() + done.len() + 1);
    }

    #[test]
    fn base_already_present_by_id_is_not_repeated() {
        let entries = commits(&["X", "A"]);
        let b = base();
        let order = DisplayOrder::build(&entries, &[], Some(&b), true);
        assert_eq!(ids(&order), vec!["X", "A"]);
        assert_eq!(order.role_of(&EntryId::from("X")), Some(RowRole::Editable));
    }

    #[test]
    fn drop_resolution_rejects_adjacent_to_self() {
        let entries = commits(&["A", "B", "C", "D"]);
        let asc = DisplayOrder::build(&entries, &[], None, true);
        let b = EntryId::from("B");
        assert_eq!(asc.resolve_drop(&b, 1, DropPosition::Before), None);
        assert_eq!(asc.resolve_drop(&b, 0, DropPosition::After), None);
        assert_eq!(asc.resolve_drop(&b, 3, DropPosition::After), Some((1, 3)));
        assert_eq!(asc.resolve_drop(&b, 0, DropPosition::Before), Some((1, 0)));

        // Descending: display [D, C, B, A]; "before C" is later than C.
        let desc = DisplayOrder::build(&entries, &[], None, false);
        assert_eq!(desc.resolve_drop(&b, 1, DropPosition::Before), Some((1, 2)));
        assert_eq!(desc.resolve_drop(&b, 1, DropPosition::After), None);
    }

    #[test]
    fn drop_onto_base_targets_index_zero() {
        let entries = commits(&["A", "B", "C"]);
        let b = base();
        let desc = DisplayOrder::build(&entries, &[], Some(&b), false);
        let c = EntryId::from("C");
        assert_eq!(desc.resolve_drop(&c, 3, DropPosition::Before), Some((2, 0)));
        assert_eq!(
            desc.resolve_drop(&EntryId::from("A"), 3, DropPosition::After),
            None
        );
        assert_eq!(desc.resolve_drop(&c, 9, DropPosition::After), None);
    }
}
