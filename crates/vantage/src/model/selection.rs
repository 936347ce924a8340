//! Selection model for collection views.
//!
//! This module provides [`SelectionModel`], which manages the set of selected
//! row indices, the current (keyboard-anchor) index, and the selection-mode
//! toggle for [`ListView`](crate::view::ListView) and
//! [`TableView`](crate::view::TableView).
//!
//! Indices are positions in the backing collection, not widget-pool rows.
//! Every member of the selected set is `< len` of the collection; entries
//! referring to deleted indices are purged lazily before any operation that
//! enumerates the set.
//!
//! # Example
//!
//! ```
//! use vantage::model::{SelectMode, SelectionModel};
//!
//! let mut selection = SelectionModel::new();
//! selection.apply(2, SelectMode::SelectOne, 10);
//! selection.apply(5, SelectMode::ExtendOne, 10);
//! assert_eq!(selection.selected_list(false), vec![2, 5]);
//!
//! // Listen for changes
//! selection.selection_changed.connect(|current| {
//!     println!("Selection is now: {:?}", current);
//! });
//! ```

use std::collections::HashSet;

use vantage_core::Signal;

/// How a selection action combines with the existing selection.
///
/// These mirror the host toolkit's click/keyboard modifier semantics: a plain
/// click is `SelectOne`, shift-click is `ExtendContinuous`, ctrl-click is
/// `ExtendOne`. The `Quiet` variants mutate membership without emitting a
/// notification and are used internally during range extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Replace the selection with the one index.
    #[default]
    SelectOne,
    /// Extend the continuous range to include the index.
    ExtendContinuous,
    /// Toggle membership of the one index, leaving the rest untouched.
    ExtendOne,
    /// Remove the index from the selection.
    Unselect,
    /// Add the index without emitting a notification.
    SelectQuiet,
    /// Remove the index without emitting a notification.
    UnselectQuiet,
    /// Ignore the action entirely.
    NoSelect,
}

/// Manages the selected index set and the current index.
///
/// # Signals
///
/// - `selection_changed`: Emitted after every non-quiet selection change,
///   with the resulting current index (`None` is the unselected sentinel).
pub struct SelectionModel {
    /// Set of selected collection indices.
    selected: HashSet<usize>,

    /// The current (most recently focused) index.
    current: Option<usize>,

    /// Selection-mode toggle: when on, plain moves/clicks extend the range
    /// instead of replacing it.
    select_mode: bool,

    /// Emitted with the resulting current index after every selection change.
    pub selection_changed: Signal<Option<usize>>,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    /// Creates an empty selection model.
    pub fn new() -> Self {
        Self {
            selected: HashSet::new(),
            current: None,
            select_mode: false,
            selection_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The current (keyboard-anchor) index.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Sets the current index without touching the selected set.
    pub fn set_current(&mut self, index: Option<usize>) {
        self.current = index;
    }

    /// Whether `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Whether anything is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Number of selected indices.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected indices sorted ascending, or descending when `descending`.
    pub fn selected_list(&self, descending: bool) -> Vec<usize> {
        let mut list: Vec<usize> = self.selected.iter().copied().collect();
        if descending {
            list.sort_unstable_by(|a, b| b.cmp(a));
        } else {
            list.sort_unstable();
        }
        list
    }

    /// The selection-mode toggle.
    pub fn select_mode(&self) -> bool {
        self.select_mode
    }

    /// Sets the selection-mode toggle.
    pub fn set_select_mode(&mut self, on: bool) {
        self.select_mode = on;
    }

    /// Flips the selection-mode toggle.
    pub fn toggle_select_mode(&mut self) {
        self.select_mode = !self.select_mode;
    }

    // =========================================================================
    // Membership mutations
    // =========================================================================

    /// Adds `index` without emitting a notification.
    pub fn select_quiet(&mut self, index: usize) {
        self.selected.insert(index);
    }

    /// Removes `index` without emitting a notification.
    pub fn unselect_quiet(&mut self, index: usize) {
        self.selected.remove(&index);
    }

    /// Clears the selected set and the current index, quietly.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.current = None;
    }

    /// Clears the selected set, emits the unselected sentinel.
    pub fn clear_selection(&mut self) {
        if self.selected.is_empty() && self.current.is_none() {
            return;
        }
        self.selected.clear();
        self.current = None;
        self.selection_changed.emit(None);
    }

    /// Selects every index in `[0, len)`.
    pub fn select_all(&mut self, len: usize) {
        self.selected = (0..len).collect();
        if self.current.is_none() && len > 0 {
            self.current = Some(0);
        }
        self.selection_changed.emit(self.current);
    }

    /// Drops any selected index `>= len`. Called before any operation that
    /// enumerates the selected set.
    pub fn purge_out_of_range(&mut self, len: usize) {
        self.selected.retain(|&idx| idx < len);
        if let Some(current) = self.current {
            if current >= len {
                self.current = if len > 0 { Some(len - 1) } else { None };
            }
        }
    }

    // =========================================================================
    // Selection actions
    // =========================================================================

    /// Applies a selection action for `index` against a collection of `len`
    /// elements.
    ///
    /// Out-of-range indices clamp to `len - 1`; on an empty collection the
    /// action is ignored. Non-quiet actions emit `selection_changed` with the
    /// resulting current index.
    pub fn apply(&mut self, index: usize, mode: SelectMode, len: usize) {
        if mode == SelectMode::NoSelect || len == 0 {
            return;
        }
        let index = index.min(len - 1);

        match mode {
            SelectMode::SelectOne => {
                // Collapse any multi-selection to just this index.
                self.selected.clear();
                self.selected.insert(index);
                self.current = Some(index);
                self.selection_changed.emit(self.current);
            }
            SelectMode::ExtendContinuous => {
                if self.selected.is_empty() {
                    self.selected.insert(index);
                    self.current = Some(index);
                    self.selection_changed.emit(self.current);
                } else {
                    self.extend_continuous(index);
                }
            }
            SelectMode::ExtendOne => {
                if self.selected.contains(&index) {
                    self.selected.remove(&index);
                } else {
                    self.selected.insert(index);
                }
                self.current = Some(index);
                self.selection_changed.emit(self.current);
            }
            SelectMode::Unselect => {
                self.current = Some(index);
                self.selected.remove(&index);
            }
            SelectMode::SelectQuiet => {
                self.current = Some(index);
                self.selected.insert(index);
            }
            SelectMode::UnselectQuiet => {
                self.current = Some(index);
                self.selected.remove(&index);
            }
            SelectMode::NoSelect => {}
        }
    }

    /// Extends the selected range to include `index`, stepping the current
    /// index one position at a time so intermediate indices are also added,
    /// then emits a single notification.
    fn extend_continuous(&mut self, index: usize) {
        let min = self.selected.iter().copied().min().unwrap_or(index);
        let max = self.selected.iter().copied().max().unwrap_or(index);

        if index < min {
            let mut cursor = min;
            while cursor > index {
                cursor -= 1;
                self.select_quiet(cursor);
            }
        } else if index > max {
            let mut cursor = max;
            while cursor < index {
                cursor += 1;
                self.select_quiet(cursor);
            }
        }
        self.selected.insert(index);
        self.current = Some(index);
        self.selection_changed.emit(self.current);
    }

    // =========================================================================
    // Renumbering under structural edits
    // =========================================================================

    /// Renumbers the selection for an insertion at `at`: every selected index
    /// `>= at` shifts up by one, so the selection keeps tracking the same
    /// logical elements.
    pub fn shift_for_insert(&mut self, at: usize) {
        self.selected = self
            .selected
            .iter()
            .map(|&idx| if idx >= at { idx + 1 } else { idx })
            .collect();
        if let Some(current) = self.current {
            if current >= at {
                self.current = Some(current + 1);
            }
        }
    }

    /// Renumbers the selection for a deletion at `at`: `at` leaves the set,
    /// every selected index `> at` shifts down by one.
    pub fn shift_for_delete(&mut self, at: usize) {
        self.selected = self
            .selected
            .iter()
            .filter(|&&idx| idx != at)
            .map(|&idx| if idx > at { idx - 1 } else { idx })
            .collect();
        if let Some(current) = self.current {
            if current == at {
                self.current = None;
            } else if current > at {
                self.current = Some(current - 1);
            }
        }
    }

    /// Remaps the selection through a sort permutation, where
    /// `perm[new_index] == old_index`. Used by the preserve-elements sort
    /// policy so the selection follows the elements it referred to.
    pub fn remap(&mut self, perm: &[usize]) {
        let mut inverse = vec![usize::MAX; perm.len()];
        for (new, &old) in perm.iter().enumerate() {
            if old < inverse.len() {
                inverse[old] = new;
            }
        }
        self.selected = self
            .selected
            .iter()
            .filter_map(|&idx| inverse.get(idx).copied())
            .filter(|&idx| idx != usize::MAX)
            .collect();
        self.current = self
            .current
            .and_then(|idx| inverse.get(idx).copied())
            .filter(|&idx| idx != usize::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_select_one_replaces() {
        let mut sel = SelectionModel::new();
        sel.apply(2, SelectMode::SelectOne, 10);
        sel.apply(5, SelectMode::SelectOne, 10);
        assert_eq!(sel.selected_list(false), vec![5]);
        assert_eq!(sel.current(), Some(5));
    }

    #[test]
    fn test_select_one_collapses_multi_selection() {
        let mut sel = SelectionModel::new();
        sel.apply(2, SelectMode::SelectOne, 10);
        sel.apply(5, SelectMode::ExtendOne, 10);
        sel.apply(7, SelectMode::ExtendOne, 10);
        assert_eq!(sel.selected_count(), 3);

        sel.apply(5, SelectMode::SelectOne, 10);
        assert_eq!(sel.selected_list(false), vec![5]);
    }

    #[test]
    fn test_extend_one_toggles_membership() {
        let mut sel = SelectionModel::new();
        sel.apply(3, SelectMode::ExtendOne, 10);
        assert!(sel.is_selected(3));
        sel.apply(3, SelectMode::ExtendOne, 10);
        assert!(!sel.is_selected(3));
    }

    #[test]
    fn test_extend_continuous_fills_intermediates() {
        let mut sel = SelectionModel::new();
        sel.apply(4, SelectMode::SelectOne, 10);
        sel.apply(7, SelectMode::ExtendContinuous, 10);
        assert_eq!(sel.selected_list(false), vec![4, 5, 6, 7]);
        assert_eq!(sel.current(), Some(7));

        sel.apply(2, SelectMode::ExtendContinuous, 10);
        assert_eq!(sel.selected_list(false), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(sel.current(), Some(2));
    }

    #[test]
    fn test_extend_continuous_on_empty_behaves_like_select_one() {
        let mut sel = SelectionModel::new();
        sel.apply(3, SelectMode::ExtendContinuous, 10);
        assert_eq!(sel.selected_list(false), vec![3]);
        assert_eq!(sel.current(), Some(3));
    }

    #[test]
    fn test_extend_continuous_inside_range() {
        let mut sel = SelectionModel::new();
        sel.apply(2, SelectMode::SelectOne, 10);
        sel.apply(6, SelectMode::ExtendContinuous, 10);
        sel.apply(4, SelectMode::ExtendContinuous, 10);
        // Already inside the range: no new members, current moves.
        assert_eq!(sel.selected_list(false), vec![2, 3, 4, 5, 6]);
        assert_eq!(sel.current(), Some(4));
    }

    #[test]
    fn test_out_of_range_clamps() {
        let mut sel = SelectionModel::new();
        sel.apply(25, SelectMode::SelectOne, 10);
        assert_eq!(sel.selected_list(false), vec![9]);
    }

    #[test]
    fn test_empty_collection_ignored() {
        let mut sel = SelectionModel::new();
        sel.apply(0, SelectMode::SelectOne, 0);
        assert!(!sel.has_selection());
        assert_eq!(sel.current(), None);
    }

    #[test]
    fn test_quiet_modes_do_not_emit() {
        let mut sel = SelectionModel::new();
        let emitted = Arc::new(Mutex::new(0usize));
        let emitted_clone = emitted.clone();
        sel.selection_changed.connect(move |_| {
            *emitted_clone.lock() += 1;
        });

        sel.apply(2, SelectMode::SelectQuiet, 10);
        sel.apply(2, SelectMode::UnselectQuiet, 10);
        sel.apply(3, SelectMode::Unselect, 10);
        assert_eq!(*emitted.lock(), 0);

        sel.apply(1, SelectMode::SelectOne, 10);
        assert_eq!(*emitted.lock(), 1);
    }

    #[test]
    fn test_emits_resulting_current() {
        let mut sel = SelectionModel::new();
        let last = Arc::new(Mutex::new(Some(99usize)));
        let last_clone = last.clone();
        sel.selection_changed.connect(move |current| {
            *last_clone.lock() = *current;
        });

        sel.apply(4, SelectMode::SelectOne, 10);
        assert_eq!(*last.lock(), Some(4));

        sel.clear_selection();
        assert_eq!(*last.lock(), None);
    }

    #[test]
    fn test_shift_for_insert() {
        // Scenario: select {2, 5}, insert at 3 => {2, 6}.
        let mut sel = SelectionModel::new();
        sel.select_quiet(2);
        sel.select_quiet(5);
        sel.shift_for_insert(3);
        assert_eq!(sel.selected_list(false), vec![2, 6]);
    }

    #[test]
    fn test_shift_for_delete() {
        // Scenario: select {2, 5}, delete 2 => {4}.
        let mut sel = SelectionModel::new();
        sel.select_quiet(2);
        sel.select_quiet(5);
        sel.shift_for_delete(2);
        assert_eq!(sel.selected_list(false), vec![4]);
    }

    #[test]
    fn test_shift_laws_hold_for_boundary_indices() {
        let mut sel = SelectionModel::new();
        sel.select_quiet(3);
        sel.shift_for_insert(3); // idx >= at shifts
        assert_eq!(sel.selected_list(false), vec![4]);

        sel.shift_for_delete(4); // deleting a selected index removes it
        assert!(!sel.has_selection());
    }

    #[test]
    fn test_purge_out_of_range() {
        let mut sel = SelectionModel::new();
        sel.select_quiet(2);
        sel.select_quiet(8);
        sel.set_current(Some(8));
        sel.purge_out_of_range(5);
        assert_eq!(sel.selected_list(false), vec![2]);
        assert_eq!(sel.current(), Some(4));
    }

    #[test]
    fn test_select_all() {
        let mut sel = SelectionModel::new();
        sel.select_all(4);
        assert_eq!(sel.selected_list(false), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_selected_list_descending() {
        let mut sel = SelectionModel::new();
        sel.select_quiet(1);
        sel.select_quiet(7);
        sel.select_quiet(3);
        assert_eq!(sel.selected_list(true), vec![7, 3, 1]);
    }

    #[test]
    fn test_remap_follows_elements() {
        let mut sel = SelectionModel::new();
        sel.select_quiet(0);
        sel.select_quiet(2);
        sel.set_current(Some(2));
        // Reverse of 4 elements: perm[new] = old.
        sel.remap(&[3, 2, 1, 0]);
        assert_eq!(sel.selected_list(false), vec![1, 3]);
        assert_eq!(sel.current(), Some(1));
    }
}
