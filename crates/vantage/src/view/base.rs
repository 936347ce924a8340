//! Shared machinery composed into both view variants.
//!
//! [`ListView`](super::ListView) and [`TableView`](super::TableView) are two
//! implementations of the sealed [`CollectionView`] trait. Rather than
//! inheriting from a base widget, each owns a [`ViewCore`]: the viewport,
//! selection model, widget pool, scroll sync and mutation engine as plain
//! composed fields. The variants differ only in how row cells are built and
//! bound.
//!
//! Every user-triggered operation here completes synchronously: selection
//! updates, the reconfigure-or-rebind decision, scrollbar sync and change
//! notification all run before the call returns.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use vantage_core::Signal;

use crate::interchange::{
    DropDisposition, TRANSFER_KIND, TransferPayload, TransferStore, decode_elements,
    encode_elements,
};
use crate::model::{
    CollectionSource, OwnerHook, SelectMode, SelectionModel, SortSelectionPolicy,
};

use super::editor::EditorRegistry;
use super::pool::WidgetPool;
use super::scroll::{ScrollSync, ScrollbarAdapter};
use super::viewport::Viewport;

/// Configuration for a collection view.
///
/// Serializable so hosts can persist view setup alongside their own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Show the index column.
    pub show_index: bool,
    /// Select-only mode: no editing, no structural affordances.
    pub read_only: bool,
    /// Allow multi-selection in read-only mode; otherwise read-only views
    /// restrict to single-selection semantics.
    pub read_only_multi_select: bool,
    /// Show the per-row insert affordance (editable views only).
    pub show_add: bool,
    /// Show the per-row delete affordance (editable views only).
    pub show_delete: bool,
    /// Minimum row count used for the widget's minimum-size hint.
    pub min_rows: usize,
    /// Row height assumed before the host reports a measured one.
    pub default_row_height: f32,
    /// What happens to the selection when a table view sorts.
    pub sort_selection: SortSelectionPolicy,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_index: true,
            read_only: false,
            read_only_multi_select: false,
            show_add: true,
            show_delete: true,
            min_rows: 4,
            default_row_height: 24.0,
            sort_selection: SortSelectionPolicy::default(),
        }
    }
}

/// What the view is currently doing. Entry points that must not re-enter
/// check this instead of ad-hoc boolean guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// No structural work in progress.
    #[default]
    Idle,
    /// A full pool rebuild is running.
    Reconfiguring,
    /// Focus is being moved to a row's first editor.
    GrabbingFocus,
}

/// The state and mutation engine shared by both view variants.
///
/// The core holds a non-owning handle to the collection plus a cached `size`;
/// the cache is refreshed before every index-using operation and never
/// trusted across a mutation.
pub(crate) struct ViewCore<S: CollectionSource> {
    pub(crate) source: Arc<S>,
    pub(crate) size: usize,
    pub(crate) viewport: Viewport,
    pub(crate) selection: SelectionModel,
    pub(crate) pool: WidgetPool,
    pub(crate) registry: Arc<EditorRegistry>,
    pub(crate) options: ViewOptions,
    pub(crate) phase: ViewPhase,
    pub(crate) modified: bool,
    /// Optional external mutex acquired around collection reads/mutations,
    /// released before observers are notified.
    pub(crate) update_guard: Option<Arc<Mutex<()>>>,
    /// Optional owner-save hook, run after every successful mutation.
    pub(crate) save_hook: Option<Arc<dyn Fn() + Send + Sync>>,
    /// Optional owner-managed element construction.
    pub(crate) owner_hook: Option<Arc<dyn OwnerHook<S>>>,
    pub(crate) scroll: ScrollSync,
    /// Snapshot of the selection taken when a move-drop lands, pre-adjusted
    /// for the insertion shift; cleared at drag end regardless of outcome.
    pub(crate) dragged: Vec<usize>,
    /// Emitted after every successful structural or value mutation.
    pub(crate) changed: Signal<()>,
}

impl<S: CollectionSource> ViewCore<S> {
    pub(crate) fn new(source: Arc<S>, registry: Arc<EditorRegistry>, options: ViewOptions) -> Self {
        let size = source.len();
        Self {
            source,
            size,
            viewport: Viewport::new(options.min_rows),
            selection: SelectionModel::new(),
            pool: WidgetPool::new(),
            registry,
            options,
            phase: ViewPhase::default(),
            modified: false,
            update_guard: None,
            save_hook: None,
            owner_hook: None,
            scroll: ScrollSync::new(),
            dragged: Vec::new(),
            changed: Signal::new(),
        }
    }

    /// Re-reads the collection length into the cache.
    pub(crate) fn refresh_size(&mut self) -> usize {
        self.size = self.source.len();
        self.size
    }

    /// Replaces the backing collection handle and resets window, selection
    /// and pool; the caller reconfigures afterwards.
    pub(crate) fn set_source(&mut self, source: Arc<S>) {
        self.source = source;
        self.selection.clear();
        self.pool.clear();
        self.viewport.set_start(0, 0);
        self.dragged.clear();
        self.modified = false;
        self.refresh_size();
    }

    /// Whether structural edits (insert/delete/paste/drag-move) are allowed.
    pub(crate) fn structural_edits_allowed(&self) -> bool {
        !self.options.read_only && !self.source.fixed_len()
    }

    /// Clones the external update guard so a lock can be held without
    /// borrowing `self` (mutations need `&mut self` while the guard is held).
    pub(crate) fn guard_handle(&self) -> Option<Arc<Mutex<()>>> {
        self.update_guard.clone()
    }

    /// Records a successful mutation: save hook first, then the changed
    /// signal. Callers must have released the update guard already.
    pub(crate) fn mark_changed(&mut self) {
        self.modified = true;
        if let Some(hook) = &self.save_hook {
            hook();
        }
        self.changed.emit(());
    }

    // =========================================================================
    // Selection plumbing
    // =========================================================================

    /// Applies a selection action, honoring read-only single-selection
    /// semantics and the selection-mode toggle.
    pub(crate) fn select_index(&mut self, index: usize, mode: SelectMode) {
        self.refresh_size();
        let mode = if mode == SelectMode::NoSelect {
            return;
        } else if self.options.read_only && !self.options.read_only_multi_select {
            SelectMode::SelectOne
        } else if self.selection.select_mode() && mode == SelectMode::SelectOne {
            // Selection-mode toggle upgrades plain actions to range extension.
            SelectMode::ExtendContinuous
        } else {
            mode
        };
        self.selection.apply(index, mode, self.size);
    }

    /// Applies a selection action for a pool row. Returns `false` when the
    /// row is outside the pool or past the end of the collection.
    pub(crate) fn select_row(&mut self, row: usize, mode: SelectMode) -> bool {
        self.refresh_size();
        let index = self.viewport.index_of(row);
        if row >= self.viewport.visible_rows() || index >= self.size {
            return false;
        }
        self.select_index(index, mode);
        true
    }

    /// Moves the current index down one row. Returns the new index, or
    /// `None` when already at the end.
    pub(crate) fn move_down(&mut self, mode: SelectMode) -> Option<usize> {
        self.refresh_size();
        if self.size == 0 {
            return None;
        }
        let next = match self.selection.current() {
            Some(c) if c + 1 >= self.size => return None,
            Some(c) => c + 1,
            None => 0,
        };
        self.select_index(next, mode);
        Some(next)
    }

    /// Moves the current index up one row. Returns the new index, or `None`
    /// when already at the start.
    pub(crate) fn move_up(&mut self, mode: SelectMode) -> Option<usize> {
        self.refresh_size();
        if self.size == 0 {
            return None;
        }
        let next = match self.selection.current() {
            Some(0) | None => return None,
            Some(c) => c - 1,
        };
        self.select_index(next, mode);
        Some(next)
    }

    /// Moves the current index down one window's worth of rows.
    pub(crate) fn move_page_down(&mut self, mode: SelectMode) -> Option<usize> {
        self.refresh_size();
        if self.size == 0 {
            return None;
        }
        let page = self.viewport.visible_rows().max(1);
        let next = match self.selection.current() {
            Some(c) if c + 1 >= self.size => return None,
            Some(c) => (c + page).min(self.size - 1),
            None => (page - 1).min(self.size - 1),
        };
        self.select_index(next, mode);
        Some(next)
    }

    /// Moves the current index up one window's worth of rows.
    pub(crate) fn move_page_up(&mut self, mode: SelectMode) -> Option<usize> {
        self.refresh_size();
        if self.size == 0 {
            return None;
        }
        let page = self.viewport.visible_rows().max(1);
        let next = match self.selection.current() {
            Some(0) | None => return None,
            Some(c) => c.saturating_sub(page),
        };
        self.select_index(next, mode);
        Some(next)
    }

    // =========================================================================
    // Structural mutations
    // =========================================================================

    /// Inserts one blank element at `index` (`None` appends). Renumbers the
    /// selection first so it keeps tracking the same logical elements.
    /// Returns the insertion index, or `None` when refused.
    pub(crate) fn insert_at(&mut self, index: Option<usize>) -> Option<usize> {
        if !self.structural_edits_allowed() {
            return None;
        }
        self.refresh_size();
        let at = index.unwrap_or(self.size).min(self.size);
        self.selection.shift_for_insert(at);

        let inserted = {
            let guard = self.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            match &self.owner_hook {
                Some(hook) => hook.insert_new(self.source.as_ref(), at, 1),
                None => usize::from(self.source.insert(at, S::Elem::default())),
            }
        };
        if inserted == 0 {
            // Owner declined: undo the renumbering.
            self.selection.shift_for_delete(at);
            return None;
        }

        self.refresh_size();
        self.mark_changed();
        Some(at)
    }

    /// Deletes the element at `index`. Removes it from the selection and
    /// renumbers the rest. Returns whether anything was removed.
    pub(crate) fn delete_at(&mut self, index: usize) -> bool {
        if !self.structural_edits_allowed() {
            return false;
        }
        self.refresh_size();
        if index >= self.size {
            return false;
        }
        self.selection.shift_for_delete(index);

        let removed = {
            let guard = self.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            self.source.remove(index).is_some()
        };
        if !removed {
            return false;
        }

        self.refresh_size();
        self.mark_changed();
        true
    }

    /// Deletes every selected element, highest index first.
    pub(crate) fn delete_selection(&mut self) -> bool {
        self.refresh_size();
        self.selection.purge_out_of_range(self.size);
        let indices = self.selection.selected_list(true);
        if indices.is_empty() {
            return false;
        }
        let mut any = false;
        for index in indices {
            any |= self.delete_at(index);
        }
        any
    }

    /// Copies the selected elements to the store, ascending index order.
    /// Returns the number of records written.
    pub(crate) fn copy_selection(&mut self, store: &mut dyn TransferStore, reset: bool) -> usize {
        self.refresh_size();
        self.selection.purge_out_of_range(self.size);
        let indices = self.selection.selected_list(false);
        if indices.is_empty() {
            return 0;
        }

        let elements: Vec<S::Elem> = {
            let guard = self.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            indices.iter().filter_map(|&i| self.source.get(i)).collect()
        };
        let payload = encode_elements(&elements);
        let count = payload.len();
        store.write(payload);

        if reset {
            self.selection.clear_selection();
        }
        count
    }

    /// Copies the selection to the store, then deletes it. Returns the index
    /// selected afterwards (the clamped position of the highest cut index).
    pub(crate) fn cut_selection(&mut self, store: &mut dyn TransferStore) -> Option<usize> {
        if !self.structural_edits_allowed() {
            return None;
        }
        self.refresh_size();
        self.selection.purge_out_of_range(self.size);
        if !self.selection.has_selection() {
            return None;
        }
        self.copy_selection(store, false);

        let indices = self.selection.selected_list(true);
        let anchor = indices[0];
        self.selection.clear();
        for index in indices {
            self.delete_at(index);
        }

        if self.size == 0 {
            return None;
        }
        let target = anchor.min(self.size - 1);
        self.selection.apply(target, SelectMode::SelectOne, self.size);
        Some(target)
    }

    /// Inserts the payload's elements sequentially starting at `index`, then
    /// selects the first inserted index. Returns it, or `None` when the
    /// payload decodes to nothing or edits are refused.
    pub(crate) fn paste_at(&mut self, payload: &TransferPayload, index: usize) -> Option<usize> {
        if !self.structural_edits_allowed() {
            return None;
        }
        let items: Vec<S::Elem> = decode_elements(payload);
        if items.is_empty() {
            return None;
        }
        self.refresh_size();
        let first = index.min(self.size);

        {
            let guard = self.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            let mut at = first;
            for item in items {
                if self.source.insert(at, item) {
                    at += 1;
                }
            }
        }

        self.refresh_size();
        self.mark_changed();
        self.selection.apply(first, SelectMode::SelectOne, self.size);
        Some(first)
    }

    /// Overwrites the element at `index` with the payload's first record
    /// only. No resize. Returns whether the assignment happened.
    pub(crate) fn paste_assign(&mut self, payload: &TransferPayload, index: usize) -> bool {
        if self.options.read_only {
            return false;
        }
        let mut items: Vec<S::Elem> = decode_elements(payload);
        if items.is_empty() {
            return false;
        }
        let first = items.swap_remove(0);
        self.refresh_size();
        if index >= self.size {
            return false;
        }

        let assigned = {
            let guard = self.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            self.source.set(index, first)
        };
        if assigned {
            self.mark_changed();
        }
        assigned
    }

    /// Copies the selected elements and pastes them immediately after the
    /// highest selected index. Returns the insertion index, or `None` when
    /// nothing was selected.
    pub(crate) fn duplicate(&mut self, store: &mut dyn TransferStore) -> Option<usize> {
        if !self.structural_edits_allowed() {
            return None;
        }
        self.refresh_size();
        self.selection.purge_out_of_range(self.size);
        let descending = self.selection.selected_list(true);
        let highest = *descending.first()?;
        let paste_index = highest + 1;

        self.copy_selection(store, true);
        let payload = store.read(TRANSFER_KIND)?;
        self.paste_at(&payload, paste_index)
    }

    // =========================================================================
    // Drag reorder
    // =========================================================================

    /// Snapshots the selected elements into a drag payload. Returns `None`
    /// when nothing is selected.
    pub(crate) fn drag_start(&mut self) -> Option<TransferPayload> {
        self.refresh_size();
        self.selection.purge_out_of_range(self.size);
        let indices = self.selection.selected_list(false);
        if indices.is_empty() {
            return None;
        }
        let elements: Vec<S::Elem> = {
            let guard = self.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            indices.iter().filter_map(|&i| self.source.get(i)).collect()
        };
        Some(encode_elements(&elements))
    }

    /// Handles a drop at `index`. For a move, the current selection is
    /// snapshotted with indices past the insertion point pre-shifted by the
    /// payload size, so [`drop_finalize`](Self::drop_finalize) can remove the
    /// originals. Returns the paste index, or `None` for a cancel.
    pub(crate) fn drag_drop(
        &mut self,
        payload: &TransferPayload,
        index: usize,
        disposition: DropDisposition,
    ) -> Option<usize> {
        match disposition {
            DropDisposition::Cancel => {
                self.dragged.clear();
                None
            }
            DropDisposition::Copy => {
                self.dragged.clear();
                self.paste_at(payload, index)
            }
            DropDisposition::Move => {
                self.save_dragged(index, payload.len());
                let pasted = self.paste_at(payload, index);
                if pasted.is_none() {
                    self.dragged.clear();
                }
                pasted
            }
        }
    }

    /// Removes the dragged originals after a confirmed move; a copy or a
    /// cancelled drop clears the snapshot without touching the collection.
    /// Returns the index selected afterwards.
    pub(crate) fn drop_finalize(&mut self, moved: bool) -> Option<usize> {
        if !moved || self.dragged.is_empty() {
            self.dragged.clear();
            return None;
        }
        let mut dragged = std::mem::take(&mut self.dragged);
        dragged.sort_unstable_by(|a, b| b.cmp(a));
        let anchor = dragged[0];
        self.selection.clear();
        for index in dragged {
            self.delete_at(index);
        }
        self.refresh_size();
        if self.size == 0 {
            return None;
        }
        let target = anchor.min(self.size - 1);
        self.selection.apply(target, SelectMode::SelectOne, self.size);
        Some(target)
    }

    /// Abandons a drag in progress, leaving collection, selection and pool
    /// exactly as they were.
    pub(crate) fn drag_cancel(&mut self) {
        self.dragged.clear();
    }

    fn save_dragged(&mut self, at: usize, count: usize) {
        self.refresh_size();
        self.selection.purge_out_of_range(self.size);
        self.dragged = self
            .selection
            .selected_list(false)
            .into_iter()
            .map(|ix| if ix >= at { ix + count } else { ix })
            .collect();
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Moves the window so `index` is visible. Returns whether it moved.
    pub(crate) fn scroll_to(&mut self, index: usize) -> bool {
        self.refresh_size();
        self.viewport.scroll_to(index, self.size)
    }

    /// Consumes a scrollbar value change. Returns whether the window moved.
    pub(crate) fn set_scroll_value(&mut self, value: i32) -> bool {
        self.refresh_size();
        self.viewport.set_start(value.max(0) as usize, self.size)
    }

    /// Attaches a scrollbar adapter and pushes the current state into it.
    pub(crate) fn set_scrollbar(&mut self, adapter: Box<dyn ScrollbarAdapter>) {
        self.scroll.set_adapter(adapter);
        self.scroll.refresh(&self.viewport, self.size);
    }

    // =========================================================================
    // Rebind chrome
    // =========================================================================

    /// The variant-independent part of a rebind: clamps the window, then
    /// updates every slot's index text, visibility, selection highlight and
    /// affordances, and refreshes the scrollbar. Value cells are bound by the
    /// variant afterwards.
    pub(crate) fn rebind_chrome(&mut self) {
        self.refresh_size();
        self.viewport.clamp_start(self.size);
        let affordances = self.structural_edits_allowed()
            && (self.options.show_add || self.options.show_delete);
        for row in 0..self.pool.len() {
            let index = self.viewport.index_of(row);
            let in_range = index < self.size;
            let selected = in_range && self.selection.is_selected(index);
            if let Some(slot) = self.pool.slot_mut(row) {
                slot.set_index_text(index.to_string());
                slot.set_visible(in_range);
                slot.set_selected(selected);
                slot.set_affordances(affordances && in_range);
            }
        }
        self.scroll.refresh(&self.viewport, self.size);
    }
}

mod sealed {
    pub trait Sealed {}
}

pub(crate) use sealed::Sealed;

/// The shared surface of the two view variants.
///
/// This trait is sealed: [`ListView`](super::ListView) and
/// [`TableView`](super::TableView) are its only implementations.
pub trait CollectionView: sealed::Sealed {
    /// Current (cached) collection length.
    fn len(&self) -> usize;

    /// Number of rows the window currently holds.
    fn visible_rows(&self) -> usize;

    /// Collection index of the first visible row.
    fn start_index(&self) -> usize;

    /// Whether the widget pool must be structurally rebuilt before the next
    /// rebind.
    fn needs_reconfigure(&self) -> bool;

    /// Destroys and recreates all row slots, then rebinds.
    fn reconfigure(&mut self);

    /// Re-points the existing slots at the current window without creating
    /// or destroying widgets.
    fn rebind(&mut self);

    /// Runs the reconfigure-or-rebind decision.
    fn refresh(&mut self) {
        if self.needs_reconfigure() {
            self.reconfigure();
        } else {
            self.rebind();
        }
    }

    /// Recomputes the visible-row count from the allocated height and the
    /// measured row height, then refreshes. Returns whether the count
    /// changed.
    fn resize(&mut self, avail_height: f32, row_height: f32) -> bool;

    /// Scrolls minimally so `index` is visible. Returns whether the window
    /// moved.
    fn scroll_to(&mut self, index: usize) -> bool;

    /// Consumes a scrollbar value change.
    fn set_scroll_value(&mut self, value: i32);
}
