//! ListView: the plain-element collection view.
//!
//! A `ListView` renders a window of single-cell rows over any
//! [`CollectionSource`] whose element type implements
//! [`CellElement`]. Rows carry an optional index column and, in editable
//! views, insert/delete affordances; the host renders the slots and routes
//! clicks, keys, scrollbar changes and drops back into the view's methods.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vantage::model::{SelectMode, VecSource};
//! use vantage::view::{CollectionView, ListView};
//!
//! let source = Arc::new(VecSource::new(vec!["ant".to_string(), "bee".to_string()]));
//! let mut view = ListView::new(source);
//!
//! // Host layout: 120 px available, 24 px rows -> 5 visible rows.
//! view.resize(120.0, 24.0);
//! view.select_index(1, SelectMode::SelectOne);
//! assert_eq!(view.selection().current(), Some(1));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use vantage_core::Signal;

use crate::interchange::{
    DropDisposition, PasteDisposition, TRANSFER_KIND, TransferPayload, TransferStore,
};
use crate::model::{CellElement, CollectionSource, OwnerHook, SelectMode, SelectionModel};

use super::base::{CollectionView, Sealed, ViewCore, ViewOptions, ViewPhase};
use super::editor::{EditorRegistry, ValueBinding};
use super::pool::RowSlot;
use super::scroll::ScrollbarAdapter;

/// A data-bound, virtualized list view over a collection of plain elements.
///
/// # Signals
///
/// - [`changed`](Self::changed): emitted after every successful structural
///   or value mutation
/// - [`selection_changed`](SelectionModel::selection_changed) (on
///   [`selection`](Self::selection)): emitted with the resulting current
///   index after every selection change
pub struct ListView<S: CollectionSource> {
    core: ViewCore<S>,
}

impl<S: CollectionSource> ListView<S>
where
    S::Elem: CellElement,
{
    /// Creates a view over `source` with default options and an empty editor
    /// registry (everything renders through the buffer fallback until the
    /// host registers factories).
    pub fn new(source: Arc<S>) -> Self {
        Self {
            core: ViewCore::new(source, Arc::new(EditorRegistry::new()), ViewOptions::default()),
        }
    }

    /// Sets the view options using builder pattern.
    pub fn with_options(mut self, options: ViewOptions) -> Self {
        self.core.options = options;
        self
    }

    /// Sets the editor registry using builder pattern.
    pub fn with_registry(mut self, registry: Arc<EditorRegistry>) -> Self {
        self.core.registry = registry;
        self
    }

    // =========================================================================
    // Source
    // =========================================================================

    /// The backing collection handle.
    pub fn source(&self) -> &Arc<S> {
        &self.core.source
    }

    /// Replaces the backing collection and reconfigures.
    pub fn set_source(&mut self, source: Arc<S>) {
        self.core.set_source(source);
        self.reconfigure();
    }

    // =========================================================================
    // Options and collaborators
    // =========================================================================

    /// The view options.
    pub fn options(&self) -> &ViewOptions {
        &self.core.options
    }

    /// Replaces the view options and refreshes.
    pub fn set_options(&mut self, options: ViewOptions) {
        self.core.options = options;
        self.refresh();
    }

    /// Sets the external mutex acquired around collection reads/mutations.
    pub fn set_update_guard(&mut self, guard: Option<Arc<Mutex<()>>>) {
        self.core.update_guard = guard;
    }

    /// Sets the owner-save hook run after every successful mutation.
    pub fn set_save_hook(&mut self, hook: Option<Arc<dyn Fn() + Send + Sync>>) {
        self.core.save_hook = hook;
    }

    /// Sets the owner-managed element construction hook.
    pub fn set_owner_hook(&mut self, hook: Option<Arc<dyn OwnerHook<S>>>) {
        self.core.owner_hook = hook;
    }

    /// Attaches the host scrollbar.
    pub fn set_scrollbar(&mut self, adapter: Box<dyn ScrollbarAdapter>) {
        self.core.set_scrollbar(adapter);
    }

    /// Emitted after every successful structural or value mutation.
    pub fn changed(&self) -> &Signal<()> {
        &self.core.changed
    }

    /// Whether the collection has been edited through this view.
    pub fn is_modified(&self) -> bool {
        self.core.modified
    }

    /// Resets the modified flag (e.g. after the host saves).
    pub fn clear_modified(&mut self) {
        self.core.modified = false;
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The selection model.
    pub fn selection(&self) -> &SelectionModel {
        &self.core.selection
    }

    /// The selection model, mutably.
    pub fn selection_mut(&mut self) -> &mut SelectionModel {
        &mut self.core.selection
    }

    /// Applies a selection action for a collection index, scrolls it into
    /// view, and refreshes.
    pub fn select_index(&mut self, index: usize, mode: SelectMode) {
        self.core.select_index(index, mode);
        self.core.scroll_to(index);
        self.refresh();
    }

    /// Applies a selection action for a pool row. Returns `false` for rows
    /// outside the pool or past the end of the collection.
    pub fn select_row(&mut self, row: usize, mode: SelectMode) -> bool {
        if !self.core.select_row(row, mode) {
            return false;
        }
        self.refresh();
        true
    }

    /// Selects every element.
    pub fn select_all(&mut self) {
        self.core.refresh_size();
        self.core.selection.select_all(self.core.size);
        self.core.selection.set_select_mode(false);
        self.refresh();
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.core.selection.clear_selection();
        self.refresh();
    }

    /// Moves the current index down one row. Returns the new index.
    pub fn move_down(&mut self, mode: SelectMode) -> Option<usize> {
        let moved = self.core.move_down(mode);
        self.finish_move(moved)
    }

    /// Moves the current index up one row. Returns the new index.
    pub fn move_up(&mut self, mode: SelectMode) -> Option<usize> {
        let moved = self.core.move_up(mode);
        self.finish_move(moved)
    }

    /// Moves the current index down one window. Returns the new index.
    pub fn move_page_down(&mut self, mode: SelectMode) -> Option<usize> {
        let moved = self.core.move_page_down(mode);
        self.finish_move(moved)
    }

    /// Moves the current index up one window. Returns the new index.
    pub fn move_page_up(&mut self, mode: SelectMode) -> Option<usize> {
        let moved = self.core.move_page_up(mode);
        self.finish_move(moved)
    }

    fn finish_move(&mut self, moved: Option<usize>) -> Option<usize> {
        if let Some(index) = moved {
            self.core.scroll_to(index);
            self.refresh();
        }
        moved
    }

    /// Scrolls `index` into view and returns the pool row whose first
    /// editor the host should focus. Guarded against re-entrant grabs.
    pub fn grab_focus(&mut self, index: usize) -> Option<usize> {
        if self.core.phase != ViewPhase::Idle {
            return None;
        }
        self.core.phase = ViewPhase::GrabbingFocus;
        self.core.refresh_size();
        if self.core.viewport.scroll_to(index, self.core.size) {
            self.rebind();
        }
        let row = self.core.viewport.row_of(index);
        self.core.phase = ViewPhase::Idle;
        row
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Inserts one blank element at `index` (`None` appends). Returns the
    /// insertion index, or `None` when the collection is fixed-length or the
    /// view is read-only.
    pub fn insert_at(&mut self, index: Option<usize>) -> Option<usize> {
        let inserted = self.core.insert_at(index);
        if inserted.is_some() {
            self.refresh();
        }
        inserted
    }

    /// Inserts one blank element at the index shown by pool row `row`
    /// (the per-row insert affordance).
    pub fn insert_at_row(&mut self, row: usize) -> Option<usize> {
        let index = self.core.viewport.index_of(row);
        self.insert_at(Some(index))
    }

    /// Deletes the element at `index`. Returns whether anything was removed.
    pub fn delete_at(&mut self, index: usize) -> bool {
        if !self.core.delete_at(index) {
            return false;
        }
        self.refresh();
        true
    }

    /// Deletes the element shown by pool row `row` (the per-row delete
    /// affordance).
    pub fn delete_at_row(&mut self, row: usize) -> bool {
        let index = self.core.viewport.index_of(row);
        self.delete_at(index)
    }

    /// Deletes every selected element.
    pub fn delete_selection(&mut self) -> bool {
        if !self.core.delete_selection() {
            return false;
        }
        self.refresh();
        true
    }

    /// Copies the selected elements to the store. Returns the record count.
    pub fn copy_selection(&mut self, store: &mut dyn TransferStore, reset: bool) -> usize {
        let count = self.core.copy_selection(store, reset);
        if reset {
            self.refresh();
        }
        count
    }

    /// Copies then deletes the selection. Returns the index selected after.
    pub fn cut_selection(&mut self, store: &mut dyn TransferStore) -> Option<usize> {
        let cut = self.core.cut_selection(store);
        if cut.is_some() {
            self.refresh();
        }
        cut
    }

    /// Pastes the store's element payload at `index` per `disposition`.
    /// Returns the affected index.
    pub fn paste(
        &mut self,
        store: &mut dyn TransferStore,
        index: usize,
        disposition: PasteDisposition,
    ) -> Option<usize> {
        let payload = store.read(TRANSFER_KIND)?;
        let result = match disposition {
            PasteDisposition::AssignTo => self
                .core
                .paste_assign(&payload, index)
                .then_some(index),
            PasteDisposition::InsertBefore => self.core.paste_at(&payload, index),
            PasteDisposition::InsertAfter => self.core.paste_at(&payload, index + 1),
        };
        if result.is_some() {
            self.refresh();
        }
        result
    }

    /// Copies the selection and pastes it after the highest selected index.
    /// Returns the insertion index, or `None` when nothing was selected.
    pub fn duplicate(&mut self, store: &mut dyn TransferStore) -> Option<usize> {
        let pasted = self.core.duplicate(store);
        if pasted.is_some() {
            self.refresh();
        }
        pasted
    }

    // =========================================================================
    // Drag reorder
    // =========================================================================

    /// Snapshots the selected elements into a drag payload.
    pub fn drag_start(&mut self) -> Option<TransferPayload> {
        self.core.drag_start()
    }

    /// Handles a drop at `index`. Returns the paste index, or `None` for a
    /// cancel.
    pub fn drag_drop(
        &mut self,
        payload: &TransferPayload,
        index: usize,
        disposition: DropDisposition,
    ) -> Option<usize> {
        let pasted = self.core.drag_drop(payload, index, disposition);
        if pasted.is_some() {
            self.refresh();
        }
        pasted
    }

    /// Removes the dragged originals after a confirmed move.
    pub fn drop_finalize(&mut self, moved: bool) -> Option<usize> {
        let selected = self.core.drop_finalize(moved);
        self.refresh();
        selected
    }

    /// Abandons a drag in progress; collection, selection and pool stay
    /// exactly as they were.
    pub fn drag_cancel(&mut self) {
        self.core.drag_cancel();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Reads pool row `row`'s editor back into the collection. Returns
    /// whether the element changed.
    pub fn commit_row(&mut self, row: usize) -> bool {
        if self.core.options.read_only {
            return false;
        }
        self.core.refresh_size();
        let index = self.core.viewport.index_of(row);
        if index >= self.core.size {
            return false;
        }
        let Some(value) = self
            .core
            .pool
            .slot(row)
            .and_then(|slot| slot.cell(0))
            .map(|cell| cell.editor().value())
        else {
            return false;
        };

        let assigned = {
            let guard = self.core.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            match self.core.source.get(index) {
                Some(mut element) => {
                    element.assign_cell(&value) && self.core.source.set(index, element)
                }
                None => false,
            }
        };
        if assigned {
            self.core.mark_changed();
        }
        assigned
    }

    // =========================================================================
    // Pool access (for host rendering)
    // =========================================================================

    /// The row slots, one per visible row.
    pub fn slots(&self) -> &[RowSlot] {
        self.core.pool.slots()
    }

    /// Widgets per row: the value editor, plus index column and affordances
    /// as configured.
    pub fn row_widget_count(&self) -> usize {
        let mut count = 1;
        if self.core.options.show_index {
            count += 1;
        }
        if self.core.structural_edits_allowed() {
            if self.core.options.show_add {
                count += 1;
            }
            if self.core.options.show_delete {
                count += 1;
            }
        }
        count
    }

    // =========================================================================
    // Window maintenance
    // =========================================================================

    /// Current (cached) collection length.
    pub fn len(&self) -> usize {
        self.core.size
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.core.size == 0
    }

    /// Number of rows the window currently holds.
    pub fn visible_rows(&self) -> usize {
        self.core.viewport.visible_rows()
    }

    /// Collection index of the first visible row.
    pub fn start_index(&self) -> usize {
        self.core.viewport.start()
    }

    /// Minimum height the host should allocate for this view.
    pub fn min_height_hint(&self) -> f32 {
        self.core.viewport.min_height_hint()
    }

    /// Whether the widget pool must be structurally rebuilt.
    pub fn needs_reconfigure(&self) -> bool {
        self.core.pool.needs_reconfigure(
            self.core.viewport.visible_rows(),
            self.row_widget_count(),
            self.core.source.stamp(),
        )
    }

    /// Destroys and recreates all row slots, then rebinds.
    pub fn reconfigure(&mut self) {
        if self.core.phase == ViewPhase::Reconfiguring {
            return;
        }
        self.core.phase = ViewPhase::Reconfiguring;
        self.core.refresh_size();
        self.core.viewport.clamp_start(self.core.size);

        let rows = self.core.viewport.visible_rows();
        let widgets = self.row_widget_count();
        let stamp = self.core.source.stamp();
        let factory = self.core.registry.resolve(S::Elem::cell_kind());
        let read_only = self.core.options.read_only;
        let source = self.core.source.clone();
        let size = self.core.size;
        let start = self.core.viewport.start();
        let placeholder = S::Elem::default().to_cell();

        let guard = self.core.guard_handle();
        let held = guard.as_ref().map(|m| m.lock());
        self.core.pool.rebuild(rows, widgets, stamp, |row| {
            let index = start + row;
            let value = if index < size {
                source
                    .get(index)
                    .map(|element| element.to_cell())
                    .unwrap_or_else(|| placeholder.clone())
            } else {
                placeholder.clone()
            };
            RowSlot::new(vec![ValueBinding::new(
                factory.create(&value, read_only),
                index,
                None,
            )])
        });
        drop(held);

        self.core.phase = ViewPhase::Idle;
        self.rebind();
    }

    /// Re-points the existing slots at the current window. No-op when the
    /// pool was never built; never creates or destroys widgets.
    pub fn rebind(&mut self) {
        if !self.core.pool.is_built() {
            return;
        }
        let guard = self.core.guard_handle();
        let held = guard.as_ref().map(|m| m.lock());
        self.core.rebind_chrome();

        let source = self.core.source.clone();
        let size = self.core.size;
        let start = self.core.viewport.start();
        let read_only = self.core.options.read_only;
        let placeholder = S::Elem::default().to_cell();

        for row in 0..self.core.pool.len() {
            let index = start + row;
            let in_range = index < size;
            let value = if in_range {
                source
                    .get(index)
                    .map(|element| element.to_cell())
                    .unwrap_or_else(|| placeholder.clone())
            } else {
                placeholder.clone()
            };
            if let Some(cell) = self
                .core
                .pool
                .slot_mut(row)
                .and_then(|slot| slot.cell_mut(0))
            {
                cell.rebind(index, &value);
                cell.editor_mut().set_read_only(read_only || !in_range);
            }
        }
        drop(held);
    }

    /// Runs the reconfigure-or-rebind decision.
    pub fn refresh(&mut self) {
        if self.needs_reconfigure() {
            self.reconfigure();
        } else {
            self.rebind();
        }
    }

    /// Recomputes the visible-row count from the allocated height and the
    /// measured row height, then refreshes. Returns whether the count
    /// changed.
    pub fn resize(&mut self, avail_height: f32, row_height: f32) -> bool {
        let (_, changed) = self.core.viewport.resize(avail_height, row_height);
        self.refresh();
        changed
    }

    /// Scrolls minimally so `index` is visible. Returns whether the window
    /// moved.
    pub fn scroll_to(&mut self, index: usize) -> bool {
        let moved = self.core.scroll_to(index);
        if moved {
            self.refresh();
        }
        moved
    }

    /// Consumes a scrollbar value change.
    pub fn set_scroll_value(&mut self, value: i32) {
        if self.core.set_scroll_value(value) {
            self.refresh();
        }
    }
}

impl<S: CollectionSource> Sealed for ListView<S> where S::Elem: CellElement {}

impl<S: CollectionSource> CollectionView for ListView<S>
where
    S::Elem: CellElement,
{
    fn len(&self) -> usize {
        ListView::len(self)
    }

    fn visible_rows(&self) -> usize {
        ListView::visible_rows(self)
    }

    fn start_index(&self) -> usize {
        ListView::start_index(self)
    }

    fn needs_reconfigure(&self) -> bool {
        ListView::needs_reconfigure(self)
    }

    fn reconfigure(&mut self) {
        ListView::reconfigure(self);
    }

    fn rebind(&mut self) {
        ListView::rebind(self);
    }

    fn resize(&mut self, avail_height: f32, row_height: f32) -> bool {
        ListView::resize(self, avail_height, row_height)
    }

    fn scroll_to(&mut self, index: usize) -> bool {
        ListView::scroll_to(self, index)
    }

    fn set_scroll_value(&mut self, value: i32) {
        ListView::set_scroll_value(self, value);
    }
}

static_assertions::assert_impl_all!(ListView<crate::model::VecSource<String>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interchange::MemoryTransferStore;
    use crate::model::{CellValue, VecSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn strings(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item-{i}")).collect()
    }

    fn view_of(n: usize, visible: usize) -> ListView<VecSource<String>> {
        let mut view = ListView::new(Arc::new(VecSource::new(strings(n))));
        view.resize(visible as f32 * 24.0, 24.0);
        view
    }

    #[test]
    fn test_resize_builds_pool() {
        let view = view_of(10, 4);
        assert_eq!(view.visible_rows(), 4);
        assert_eq!(view.slots().len(), 4);
        assert_eq!(view.slots()[0].cells()[0].editor().value(), CellValue::from("item-0"));
    }

    #[test]
    fn test_zero_visible_rows_has_no_slots() {
        // Scenario E: a window too short for a single row keeps an empty,
        // crash-free pool.
        let mut view = view_of(10, 4);
        view.resize(10.0, 24.0);
        assert_eq!(view.visible_rows(), 0);
        assert_eq!(view.slots().len(), 0);
        view.rebind(); // must not panic
    }

    #[test]
    fn test_zero_height_resize_keeps_pool() {
        let mut view = view_of(10, 4);
        assert!(!view.resize(0.0, 24.0));
        assert_eq!(view.slots().len(), 4);
    }

    #[test]
    fn test_scroll_to_scenario() {
        // Scenario A: size 10, 4 visible, start 0.
        let mut view = view_of(10, 4);
        assert!(view.scroll_to(9));
        assert_eq!(view.start_index(), 6);
        assert!(view.scroll_to(0));
        assert_eq!(view.start_index(), 0);
    }

    #[test]
    fn test_rebind_reflects_window_slide() {
        let mut view = view_of(10, 4);
        view.set_scroll_value(6);
        assert_eq!(view.start_index(), 6);
        let slots = view.slots();
        assert_eq!(slots[0].index_text(), "6");
        assert_eq!(slots[0].cells()[0].editor().value(), CellValue::from("item-6"));
        assert_eq!(slots[3].cells()[0].editor().value(), CellValue::from("item-9"));
    }

    #[test]
    fn test_rebind_is_idempotent() {
        let mut view = view_of(10, 4);
        view.set_scroll_value(3);
        view.select_index(4, SelectMode::SelectOne);

        let snapshot = |view: &ListView<VecSource<String>>| {
            view.slots()
                .iter()
                .map(|slot| {
                    (
                        slot.index_text().to_string(),
                        slot.is_visible(),
                        slot.is_selected(),
                        slot.cells()[0].editor().value(),
                    )
                })
                .collect::<Vec<_>>()
        };

        let before = snapshot(&view);
        view.rebind();
        view.rebind();
        assert_eq!(snapshot(&view), before);
    }

    #[test]
    fn test_window_past_end_binds_placeholder() {
        let mut view = view_of(2, 4);
        let slots = view.slots();
        assert!(slots[0].is_visible());
        assert!(slots[1].is_visible());
        assert!(!slots[2].is_visible());
        assert!(!slots[3].is_visible());
        // Out-of-range slots stay bound to the neutral placeholder.
        assert_eq!(slots[2].cells()[0].editor().value(), CellValue::from(""));
        view.rebind(); // still fine
    }

    #[test]
    fn test_insert_shifts_selection() {
        // Scenario B: select {2, 5}, insert at 3 -> {2, 6}.
        let mut view = view_of(10, 4);
        view.select_index(2, SelectMode::SelectOne);
        view.select_index(5, SelectMode::ExtendOne);
        assert_eq!(view.selection().selected_list(false), vec![2, 5]);

        assert_eq!(view.insert_at(Some(3)), Some(3));
        assert_eq!(view.selection().selected_list(false), vec![2, 6]);
        assert_eq!(view.len(), 11);
        assert_eq!(view.source().get(3).as_deref(), Some(""));
    }

    #[test]
    fn test_delete_shifts_selection() {
        // Scenario C: select {2, 5}, delete 2 -> {4}.
        let mut view = view_of(10, 4);
        view.select_index(2, SelectMode::SelectOne);
        view.select_index(5, SelectMode::ExtendOne);

        assert!(view.delete_at(2));
        assert_eq!(view.selection().selected_list(false), vec![4]);
        assert_eq!(view.len(), 9);
    }

    #[test]
    fn test_insert_append() {
        let mut view = view_of(3, 4);
        assert_eq!(view.insert_at(None), Some(3));
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut view = view_of(3, 4);
        assert!(!view.delete_at(3));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_fixed_length_refuses_structural_edits() {
        let mut view = ListView::new(Arc::new(VecSource::fixed(strings(3))));
        view.resize(96.0, 24.0);
        assert_eq!(view.insert_at(Some(0)), None);
        assert!(!view.delete_at(0));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_read_only_refuses_structural_edits() {
        let mut view = view_of(3, 4);
        let mut options = ViewOptions::default();
        options.read_only = true;
        view.set_options(options);
        assert_eq!(view.insert_at(Some(0)), None);
        assert!(!view.delete_at(0));
    }

    #[test]
    fn test_read_only_restricts_to_single_selection() {
        let mut view = view_of(10, 4);
        let mut options = ViewOptions::default();
        options.read_only = true;
        view.set_options(options);

        view.select_index(2, SelectMode::SelectOne);
        view.select_index(5, SelectMode::ExtendOne);
        assert_eq!(view.selection().selected_list(false), vec![5]);
    }

    #[test]
    fn test_changed_signal_and_save_hook() {
        let mut view = view_of(3, 4);
        let changes = Arc::new(AtomicUsize::new(0));
        let saves = Arc::new(AtomicUsize::new(0));

        let changes_clone = changes.clone();
        view.changed().connect(move |_| {
            changes_clone.fetch_add(1, Ordering::SeqCst);
        });
        let saves_clone = saves.clone();
        view.set_save_hook(Some(Arc::new(move || {
            saves_clone.fetch_add(1, Ordering::SeqCst);
        })));

        view.insert_at(Some(1));
        view.delete_at(1);
        assert_eq!(changes.load(Ordering::SeqCst), 2);
        assert_eq!(saves.load(Ordering::SeqCst), 2);
        assert!(view.is_modified());
    }

    #[test]
    fn test_copy_cut_paste_round_trip() {
        let mut view = view_of(5, 4);
        let mut store = MemoryTransferStore::new();

        view.select_index(1, SelectMode::SelectOne);
        view.select_index(2, SelectMode::ExtendOne);
        assert_eq!(view.copy_selection(&mut store, false), 2);

        // Paste before index 0: the two copied elements land at 0 and 1.
        let pasted = view.paste(&mut store, 0, PasteDisposition::InsertBefore);
        assert_eq!(pasted, Some(0));
        assert_eq!(view.len(), 7);
        assert_eq!(view.source().get(0).as_deref(), Some("item-1"));
        assert_eq!(view.source().get(1).as_deref(), Some("item-2"));
        // The first pasted index is selected.
        assert_eq!(view.selection().selected_list(false), vec![0]);
    }

    #[test]
    fn test_paste_assign_overwrites_single_element() {
        let mut view = view_of(5, 4);
        let mut store = MemoryTransferStore::new();
        view.select_index(4, SelectMode::SelectOne);
        view.copy_selection(&mut store, false);

        assert_eq!(view.paste(&mut store, 1, PasteDisposition::AssignTo), Some(1));
        assert_eq!(view.len(), 5);
        assert_eq!(view.source().get(1).as_deref(), Some("item-4"));
    }

    #[test]
    fn test_cut_selects_clamped_anchor() {
        let mut view = view_of(5, 4);
        let mut store = MemoryTransferStore::new();
        view.select_index(3, SelectMode::SelectOne);
        view.select_index(4, SelectMode::ExtendOne);

        assert_eq!(view.cut_selection(&mut store), Some(2));
        assert_eq!(view.len(), 3);
        assert_eq!(view.selection().selected_list(false), vec![2]);
        // The cut elements are on the store.
        let payload = store.read(TRANSFER_KIND).unwrap();
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_duplicate_scenario() {
        // Scenario D: selection {1, 3} on 5 elements -> 2 copies after
        // index 3, size 7, insertion index 4.
        let mut view = view_of(5, 4);
        let mut store = MemoryTransferStore::new();
        view.select_index(1, SelectMode::SelectOne);
        view.select_index(3, SelectMode::ExtendOne);

        assert_eq!(view.duplicate(&mut store), Some(4));
        assert_eq!(view.len(), 7);
        assert_eq!(view.source().get(4).as_deref(), Some("item-1"));
        assert_eq!(view.source().get(5).as_deref(), Some("item-3"));
    }

    #[test]
    fn test_duplicate_without_selection() {
        let mut view = view_of(5, 4);
        let mut store = MemoryTransferStore::new();
        assert_eq!(view.duplicate(&mut store), None);
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn test_drag_reorder_move() {
        let mut view = view_of(5, 5);
        view.select_index(0, SelectMode::SelectOne);
        view.select_index(1, SelectMode::ExtendOne);

        let payload = view.drag_start().unwrap();
        assert_eq!(payload.len(), 2);

        // Move-drop at index 4 (before "item-4").
        assert_eq!(view.drag_drop(&payload, 4, DropDisposition::Move), Some(4));
        assert_eq!(view.len(), 7);

        view.drop_finalize(true);
        assert_eq!(view.len(), 5);
        let items: Vec<String> =
            (0..5).map(|i| view.source().get(i).unwrap()).collect();
        assert_eq!(items, vec!["item-2", "item-3", "item-0", "item-1", "item-4"]);
    }

    #[test]
    fn test_drag_cancel_leaves_everything_unchanged() {
        let mut view = view_of(5, 5);
        view.select_index(1, SelectMode::SelectOne);
        let payload = view.drag_start().unwrap();

        assert_eq!(view.drag_drop(&payload, 3, DropDisposition::Cancel), None);
        view.drop_finalize(false);
        assert_eq!(view.len(), 5);
        assert_eq!(view.selection().selected_list(false), vec![1]);
    }

    #[test]
    fn test_drag_copy_keeps_originals() {
        let mut view = view_of(3, 5);
        view.select_index(0, SelectMode::SelectOne);
        let payload = view.drag_start().unwrap();

        assert_eq!(view.drag_drop(&payload, 3, DropDisposition::Copy), Some(3));
        view.drop_finalize(false);
        assert_eq!(view.len(), 4);
        assert_eq!(view.source().get(3).as_deref(), Some("item-0"));
    }

    #[test]
    fn test_commit_row_writes_edit_back() {
        let mut view = view_of(5, 4);
        view.set_scroll_value(1);
        // Host types into row 2's editor (collection index 3).
        view.core
            .pool
            .slot_mut(2)
            .unwrap()
            .cell_mut(0)
            .unwrap()
            .editor_mut()
            .bind(&CellValue::from("edited"));

        assert!(view.commit_row(2));
        assert_eq!(view.source().get(3).as_deref(), Some("edited"));
        assert!(view.is_modified());
    }

    #[test]
    fn test_commit_row_past_end_is_noop() {
        let mut view = view_of(2, 4);
        assert!(!view.commit_row(3));
    }

    #[test]
    fn test_mutation_reclamps_window() {
        let mut view = view_of(10, 4);
        view.set_scroll_value(6);
        for index in (4..10).rev() {
            view.delete_at(index);
        }
        // 4 elements remain; the window must have clamped to the top.
        assert_eq!(view.len(), 4);
        assert_eq!(view.start_index(), 0);
    }

    #[test]
    fn test_movement_helpers() {
        let mut view = view_of(10, 4);
        assert_eq!(view.move_down(SelectMode::SelectOne), Some(0));
        assert_eq!(view.move_down(SelectMode::SelectOne), Some(1));
        assert_eq!(view.move_page_down(SelectMode::SelectOne), Some(5));
        assert_eq!(view.move_page_up(SelectMode::SelectOne), Some(1));
        assert_eq!(view.move_up(SelectMode::SelectOne), Some(0));
        assert_eq!(view.move_up(SelectMode::SelectOne), None);
    }

    #[test]
    fn test_select_row_maps_through_window() {
        let mut view = view_of(10, 4);
        view.set_scroll_value(5);
        assert!(view.select_row(1, SelectMode::SelectOne));
        assert_eq!(view.selection().current(), Some(6));
        // Rows past the collection end are refused.
        let mut short = view_of(2, 4);
        assert!(!short.select_row(3, SelectMode::SelectOne));
    }

    #[test]
    fn test_select_scrolls_into_view() {
        let mut view = view_of(20, 4);
        view.select_index(15, SelectMode::SelectOne);
        assert!(view.start_index() >= 12);
        assert!(view.core.viewport.is_visible(15));
        let row = view.grab_focus(15).unwrap();
        assert_eq!(view.core.viewport.index_of(row), 15);
    }

    #[test]
    fn test_set_source_reconfigures() {
        let mut view = view_of(5, 4);
        view.select_index(2, SelectMode::SelectOne);
        view.set_source(Arc::new(VecSource::new(strings(2))));
        assert_eq!(view.len(), 2);
        assert!(!view.selection().has_selection());
        assert_eq!(view.slots().len(), 4);
        assert!(!view.slots()[2].is_visible());
    }

    #[test]
    fn test_selection_signal_reports_current() {
        let mut view = view_of(5, 4);
        let last = Arc::new(Mutex::new(None::<Option<usize>>));
        let last_clone = last.clone();
        view.selection()
            .selection_changed
            .connect(move |current| {
                *last_clone.lock() = Some(*current);
            });

        view.select_index(3, SelectMode::SelectOne);
        assert_eq!(*last.lock(), Some(Some(3)));

        view.clear_selection();
        assert_eq!(*last.lock(), Some(None));
    }

    #[test]
    fn test_update_guard_is_acquired_and_released() {
        let mut view = view_of(5, 4);
        let guard = Arc::new(Mutex::new(()));
        view.set_update_guard(Some(guard.clone()));

        view.insert_at(Some(0));
        view.delete_at(0);
        // Released again: an outside lock succeeds.
        assert!(guard.try_lock().is_some());
    }
}
