use std::collections::HashSet;

use crate::model::{Entry, EntryId};

use super::display::{DisplayOrder, RowRole};

/// Multi-selection over display rows.
///
/// The base row can hold focus (so it can be navigated to and used as a
/// drop target) but is never part of the selected set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<EntryId>,
    anchor: Option<EntryId>,
    focused: Option<EntryId>,
}

impl Selection {
    pub fn is_selected(&self, id: &EntryId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<&EntryId> {
        self.anchor.as_ref()
    }

    pub fn focused(&self) -> Option<&EntryId> {
        self.focused.as_ref()
    }

    /// Makes `id` the only selected row. Ids not on screen are ignored.
    pub fn select_single(&mut self, id: &EntryId, display: &DisplayOrder) {
        if !display.contains(id) {
            return;
        }
        self.selected.clear();
        if !display.is_base(id) {
            self.selected.insert(id.clone());
        }
        self.anchor = Some(id.clone());
        self.focused = Some(id.clone());
    }

    pub fn toggle(&mut self, id: &EntryId, display: &DisplayOrder) {
        if display.is_base(id) || !display.contains(id) {
            return;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
        self.anchor = Some(id.clone());
        self.focused = Some(id.clone());
    }

    /// Replaces the selection with the inclusive display slice between
    /// `anchor` and `target`. Leaves everything alone if either id is gone.
    pub fn select_range(&mut self, anchor: &EntryId, target: &EntryId, display: &DisplayOrder) {
        let (Some(a), Some(b)) = (display.index_of(anchor), display.index_of(target)) else {
            return;
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.selected = display.rows()[lo..=hi]
            .iter()
            .filter(|r| r.role != RowRole::Base)
            .map(|r| r.entry.id.clone())
            .collect();
        self.anchor = Some(anchor.clone());
        self.focused = Some(target.clone());
    }

    /// Keyboard range extension: the anchor stays fixed while focus moves.
    pub fn extend_to(&mut self, target: &EntryId, display: &DisplayOrder) {
        let anchor = self
            .anchor
            .clone()
            .or_else(|| self.focused.clone())
            .unwrap_or_else(|| target.clone());
        self.select_range(&anchor, target, display);
    }

    pub fn select_all(&mut self, entries: &[Entry]) {
        self.selected = entries.iter().map(|e| e.id.clone()).collect();
        if self.focused.is_none() {
            self.focused = entries.first().map(|e| e.id.clone());
        }
    }

    /// Selected ids in canonical order.
    pub fn ordered_ids(&self, entries: &[Entry]) -> Vec<EntryId> {
        entries
            .iter()
            .filter(|e| self.selected.contains(&e.id))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Drops ids that no longer exist after a host push and re-homes focus.
    pub fn retain_present(&mut self, display: &DisplayOrder) {
        self.selected
            .retain(|id| display.contains(id) && !display.is_base(id));
        if self.anchor.as_ref().is_some_and(|id| !display.contains(id)) {
            self.anchor = None;
        }
        if self.focused.as_ref().is_some_and(|id| !display.contains(id)) {
            self.focused = display.rows().first().map(|r| r.entry.id.clone());
        }
    }

    /// Sha of the focused commit, reported to the host as the primary pick.
    pub fn primary_sha<'a>(&self, display: &'a DisplayOrder) -> Option<&'a str> {
        let idx = display.index_of(self.focused.as_ref()?)?;
        display.rows()[idx].entry.sha.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, BaseEntry};

    fn display(ids: &[&str], ascending: bool) -> (Vec<Entry>, DisplayOrder) {
        let entries: Vec<Entry> = ids
            .iter()
            .map(|id| Entry::commit(*id, Action::Pick, *id, ""))
            .collect();
        let base = BaseEntry {
            sha: "X".to_string(),
            message: String::new(),
        };
        let order = DisplayOrder::build(&entries, &[], Some(&base), ascending);
        (entries, order)
    }

    fn id(s: &str) -> EntryId {
        EntryId::from(s)
    }

    fn sorted(sel: &Selection, entries: &[Entry]) -> Vec<String> {
        sel.ordered_ids(entries)
            .into_iter()
            .map(|i| i.0)
            .collect()
    }

    #[test]
    fn range_covers_display_slice() {
        let (entries, order) = display(&["A", "B", "C", "D", "E"], true);
        let mut sel = Selection::default();
        sel.select_range(&id("B"), &id("D"), &order);
        assert_eq!(sorted(&sel, &entries), vec!["B", "C", "D"]);
        assert_eq!(sel.focused(), Some(&id("D")));
    }

    #[test]
    fn select_single_ignores_unknown_ids() {
        let (entries, order) = display(&["A", "B"], true);
        let mut sel = Selection::default();
        sel.select_single(&id("A"), &order);
        sel.select_single(&id("gone"), &order);
        assert_eq!(sorted(&sel, &entries), vec!["A"]);
        assert_eq!(sel.focused(), Some(&id("A")));
        assert!(!sel.is_selected(&id("gone")));
    }

    #[test]
    fn range_through_base_excludes_it() {
        let (entries, order) = display(&["A", "B"], false);
        // Display: [B, A, X]
        let mut sel = Selection::default();
        sel.select_range(&id("B"), &id("X"), &order);
        assert_eq!(sorted(&sel, &entries), vec!["A", "B"]);
        assert!(!sel.is_selected(&id("X")));
    }

    #[test]
    fn shift_navigation_recomputes_from_fixed_anchor() {
        let (entries, order) = display(&["A", "B", "C", "D"], true);
        let mut sel = Selection::default();
        sel.select_single(&id("B"), &order);
        sel.extend_to(&id("D"), &order);
        assert_eq!(sorted(&sel, &entries), vec!["B", "C", "D"]);
        sel.extend_to(&id("C"), &order);
        assert_eq!(sorted(&sel, &entries), vec!["B", "C"]);
        sel.extend_to(&id("A"), &order);
        assert_eq!(sorted(&sel, &entries), vec!["A", "B"]);
        assert_eq!(sel.anchor(), Some(&id("B")));
    }

    #[test]
    fn toggle_and_select_all_skip_base() {
        let (entries, order) = display(&["A", "B"], true);
        let mut sel = Selection::default();
        sel.toggle(&id("X"), &order);
        assert!(sel.is_empty());
        sel.toggle(&id("A"), &order);
        sel.toggle(&id("B"), &order);
        sel.toggle(&id("A"), &order);
        assert_eq!(sorted(&sel, &entries), vec!["B"]);

        sel.select_single(&id("X"), &order);
        assert!(sel.is_empty());
        assert_eq!(sel.focused(), Some(&id("X")));

        sel.select_all(&entries);
        assert_eq!(sel.len(), 2);
        assert!(!sel.is_selected(&id("X")));
    }

    #[test]
    fn retain_present_prunes_vanished_ids() {
        let (entries, order) = display(&["A", "B", "C"], true);
        let mut sel = Selection::default();
        sel.select_all(&entries);
        sel.select_single(&id("C"), &order);
        sel.toggle(&id("B"), &order);

        let (_, shrunk) = display(&["A", "C"], true);
        sel.retain_present(&shrunk);
        assert!(sel.is_selected(&id("C")));
        assert!(!sel.is_selected(&id("B")));
        assert_eq!(sel.focused(), Some(&id("X")));
        assert_eq!(sel.primary_sha(&shrunk), Some("X"));
    }
}
