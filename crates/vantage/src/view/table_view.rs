//! TableView: the structured-record collection view.
//!
//! A `TableView` renders a window of multi-cell rows over any
//! [`CollectionSource`] whose element type implements [`Record`]. The visible
//! field list is computed once per bind (identical for every row), each
//! visible field gets one editor column, and clicking a header sorts the
//! collection by that field, ascending first and toggling to descending on a
//! repeated click.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vantage::model::{CellKind, CellValue, FieldDescriptor, Record, VecSource};
//! use vantage::view::{CollectionView, TableView};
//!
//! #[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Record for Person {
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::new("Name", CellKind::Text),
//!             FieldDescriptor::new("Age", CellKind::Int),
//!         ]
//!     }
//!
//!     fn field(&self, index: usize) -> CellValue {
//!         match index {
//!             0 => CellValue::Text(self.name.clone()),
//!             _ => CellValue::Int(self.age),
//!         }
//!     }
//!
//!     fn set_field(&mut self, index: usize, value: &CellValue) -> bool {
//!         match (index, value) {
//!             (0, CellValue::Text(s)) => {
//!                 self.name = s.clone();
//!                 true
//!             }
//!             (1, CellValue::Int(n)) => {
//!                 self.age = *n;
//!                 true
//!             }
//!             _ => false,
//!         }
//!     }
//! }
//!
//! let source = Arc::new(VecSource::new(vec![
//!     Person { name: "Ada".into(), age: 36 },
//!     Person { name: "Grace".into(), age: 45 },
//! ]));
//! let mut view = TableView::new(source);
//! view.resize(120.0, 24.0);
//! view.sort_by(1); // sort by Age, ascending
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use vantage_core::Signal;

use crate::interchange::{
    DropDisposition, PasteDisposition, TRANSFER_KIND, TransferPayload, TransferStore,
};
use crate::model::{
    CollectionSource, FieldDescriptor, OwnerHook, Record, SelectMode, SelectionModel,
    SortIndicator, SortSelectionPolicy, SortState,
};

use super::base::{CollectionView, Sealed, ViewCore, ViewOptions, ViewPhase};
use super::editor::{EditorFactory, EditorRegistry, ValueBinding};
use super::pool::RowSlot;
use super::scroll::ScrollbarAdapter;

/// One header cell, exposed as state for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Column label.
    pub label: String,
    /// Sort indicator for this column.
    pub indicator: SortIndicator,
}

/// A data-bound, virtualized table view over a collection of records.
///
/// # Signals
///
/// - [`changed`](Self::changed): emitted after every successful structural
///   or value mutation
/// - [`selection_changed`](SelectionModel::selection_changed) (on
///   [`selection`](Self::selection)): emitted with the resulting current
///   index after every selection change
pub struct TableView<S: CollectionSource> {
    core: ViewCore<S>,
    sort: SortState,
    /// Visible fields as (raw field index, descriptor), computed per bind.
    vis_fields: Vec<(usize, FieldDescriptor)>,
    header: Vec<HeaderCell>,
}

impl<S: CollectionSource> TableView<S>
where
    S::Elem: Record,
{
    /// Creates a view over `source` with default options and an empty editor
    /// registry.
    pub fn new(source: Arc<S>) -> Self {
        let mut view = Self {
            core: ViewCore::new(source, Arc::new(EditorRegistry::new()), ViewOptions::default()),
            sort: SortState::default(),
            vis_fields: Vec::new(),
            header: Vec::new(),
        };
        view.cache_visible_fields();
        view.rebuild_header();
        view
    }

    /// Sets the view options using builder pattern.
    pub fn with_options(mut self, options: ViewOptions) -> Self {
        self.core.options = options;
        self.cache_visible_fields();
        self.rebuild_header();
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
        self.cache_visible_fields();
        self.rebuild_header();
        self.reconfigure();
    }

    // =========================================================================
    // Options and collaborators
    // =========================================================================

    /// The view options.
    pub fn options(&self) -> &ViewOptions {
        &self.core.options
    }

    /// Replaces the view options, recomputes the visible fields (their
    /// scopes depend on the read-only state) and refreshes.
    pub fn set_options(&mut self, options: ViewOptions) {
        self.core.options = options;
        self.cache_visible_fields();
        self.rebuild_header();
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
    // Fields and header
    // =========================================================================

    /// The visible fields as (raw field index, descriptor).
    pub fn visible_fields(&self) -> &[(usize, FieldDescriptor)] {
        &self.vis_fields
    }

    /// The header cells, one per visible field.
    pub fn header(&self) -> &[HeaderCell] {
        &self.header
    }

    fn cache_visible_fields(&mut self) {
        let read_only = self.core.options.read_only;
        self.vis_fields = S::Elem::fields()
            .into_iter()
            .enumerate()
            .filter(|(_, field)| field.scope.visible(read_only))
            .collect();
    }

    fn rebuild_header(&mut self) {
        self.header = self
            .vis_fields
            .iter()
            .enumerate()
            .map(|(column, (_, field))| HeaderCell {
                label: field.label.to_string(),
                indicator: self.sort.indicator(column),
            })
            .collect();
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// The active sort state.
    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// Sorts by the visible field at `column`: ascending on first request,
    /// toggling direction on a repeated request. Stable sort; triggers a
    /// full reconfigure (header indicators and row contents both change).
    pub fn sort_by(&mut self, column: usize) {
        if column >= self.vis_fields.len() {
            return;
        }
        self.sort.request(column);
        self.apply_sort();
        self.rebuild_header();
        self.reconfigure();
    }

    /// The active sort as `"Field:up"` / `"Field:down"`, for persistence.
    pub fn sort_field_name(&self) -> Option<String> {
        let column = self.sort.field?;
        let (_, field) = self.vis_fields.get(column)?;
        let direction = if self.sort.descending { "down" } else { "up" };
        Some(format!("{}:{}", field.name, direction))
    }

    /// Restores a sort previously reported by
    /// [`sort_field_name`](Self::sort_field_name). Unknown field names are
    /// ignored.
    pub fn set_sort_field_name(&mut self, name: &str) {
        let mut parts = name.splitn(2, ':');
        let field_name = parts.next().unwrap_or_default();
        if field_name.is_empty() {
            return;
        }
        let Some(column) = self
            .vis_fields
            .iter()
            .position(|(_, field)| field.name == field_name)
        else {
            return;
        };
        self.sort.field = Some(column);
        self.sort.descending = matches!(parts.next(), Some("down"));
        self.apply_sort();
        self.rebuild_header();
        self.reconfigure();
    }

    fn apply_sort(&mut self) {
        let Some(column) = self.sort.field else {
            return;
        };
        let raw = match self.vis_fields.get(column) {
            Some((raw, _)) => *raw,
            None => return,
        };
        let descending = self.sort.descending;

        let perm = {
            let guard = self.core.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            self.core.source.sort_with(&mut |a, b| {
                let ord = a.field(raw).total_cmp(&b.field(raw));
                if descending { ord.reverse() } else { ord }
            })
        };

        if self.core.options.sort_selection == SortSelectionPolicy::PreserveElements {
            self.core.selection.remap(&perm);
        }
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
    /// focusable editor the host should focus. Guarded against re-entrant
    /// grabs.
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

    /// Inserts one blank record at `index` (`None` appends). Returns the
    /// insertion index, or `None` when refused.
    pub fn insert_at(&mut self, index: Option<usize>) -> Option<usize> {
        let inserted = self.core.insert_at(index);
        if inserted.is_some() {
            self.refresh();
        }
        inserted
    }

    /// Inserts one blank record at the index shown by pool row `row`.
    pub fn insert_at_row(&mut self, row: usize) -> Option<usize> {
        let index = self.core.viewport.index_of(row);
        self.insert_at(Some(index))
    }

    /// Deletes the record at `index`. Returns whether anything was removed.
    pub fn delete_at(&mut self, index: usize) -> bool {
        if !self.core.delete_at(index) {
            return false;
        }
        self.refresh();
        true
    }

    /// Deletes the record shown by pool row `row`.
    pub fn delete_at_row(&mut self, row: usize) -> bool {
        let index = self.core.viewport.index_of(row);
        self.delete_at(index)
    }

    /// Deletes every selected record.
    pub fn delete_selection(&mut self) -> bool {
        if !self.core.delete_selection() {
            return false;
        }
        self.refresh();
        true
    }

    /// Copies the selected records to the store. Returns the record count.
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

    /// Pastes the store's record payload at `index` per `disposition`.
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

    /// Snapshots the selected records into a drag payload.
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

    /// Abandons a drag in progress.
    pub fn drag_cancel(&mut self) {
        self.core.drag_cancel();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Reads the editor at (pool row, visible column) back into the record.
    /// Returns whether the record changed.
    pub fn commit_cell(&mut self, row: usize, column: usize) -> bool {
        if self.core.options.read_only {
            return false;
        }
        let (raw, field_read_only) = match self.vis_fields.get(column) {
            Some((raw, field)) => (*raw, field.read_only),
            None => return false,
        };
        if field_read_only {
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
            .and_then(|slot| slot.cell(column))
            .map(|cell| cell.editor().value())
        else {
            return false;
        };

        let assigned = {
            let guard = self.core.guard_handle();
            let _held = guard.as_ref().map(|m| m.lock());
            match self.core.source.get(index) {
                Some(mut record) => {
                    record.set_field(raw, &value) && self.core.source.set(index, record)
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

    /// Widgets per row: one editor per visible field, plus index column and
    /// affordances as configured.
    pub fn row_widget_count(&self) -> usize {
        let mut count = self.vis_fields.len();
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
        let read_only = self.core.options.read_only;
        let source = self.core.source.clone();
        let size = self.core.size;
        let start = self.core.viewport.start();
        let placeholder = S::Elem::default();

        // Resolve one factory per visible field, once per reconfigure.
        let fields: Vec<(usize, bool)> = self
            .vis_fields
            .iter()
            .map(|(raw, field)| (*raw, field.read_only))
            .collect();
        let factories: Vec<Arc<dyn EditorFactory>> = self
            .vis_fields
            .iter()
            .map(|(_, field)| self.core.registry.resolve(field.kind))
            .collect();

        let guard = self.core.guard_handle();
        let held = guard.as_ref().map(|m| m.lock());
        self.core.pool.rebuild(rows, widgets, stamp, |row| {
            let index = start + row;
            let element = if index < size {
                source.get(index).unwrap_or_else(|| placeholder.clone())
            } else {
                placeholder.clone()
            };
            let cells = fields
                .iter()
                .enumerate()
                .map(|(column, &(raw, field_read_only))| {
                    let value = element.field(raw);
                    ValueBinding::new(
                        factories[column].create(&value, read_only || field_read_only),
                        index,
                        Some(raw),
                    )
                })
                .collect();
            RowSlot::new(cells)
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
        let view_read_only = self.core.options.read_only;
        let placeholder = S::Elem::default();

        for row in 0..self.core.pool.len() {
            let index = start + row;
            let in_range = index < size;
            let element = if in_range {
                source.get(index).unwrap_or_else(|| placeholder.clone())
            } else {
                placeholder.clone()
            };
            for column in 0..self.vis_fields.len() {
                let (raw, field_read_only) = {
                    let (raw, field) = &self.vis_fields[column];
                    (*raw, field.read_only)
                };
                let value = element.field(raw);
                if let Some(cell) = self
                    .core
                    .pool
                    .slot_mut(row)
                    .and_then(|slot| slot.cell_mut(column))
                {
                    cell.rebind(index, &value);
                    cell.editor_mut()
                        .set_read_only(view_read_only || field_read_only || !in_range);
                }
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

impl<S: CollectionSource> Sealed for TableView<S> where S::Elem: Record {}

impl<S: CollectionSource> CollectionView for TableView<S>
where
    S::Elem: Record,
{
    fn len(&self) -> usize {
        TableView::len(self)
    }

    fn visible_rows(&self) -> usize {
        TableView::visible_rows(self)
    }

    fn start_index(&self) -> usize {
        TableView::start_index(self)
    }

    fn needs_reconfigure(&self) -> bool {
        TableView::needs_reconfigure(self)
    }

    fn reconfigure(&mut self) {
        TableView::reconfigure(self);
    }

    fn rebind(&mut self) {
        TableView::rebind(self);
    }

    fn resize(&mut self, avail_height: f32, row_height: f32) -> bool {
        TableView::resize(self, avail_height, row_height)
    }

    fn scroll_to(&mut self, index: usize) -> bool {
        TableView::scroll_to(self, index)
    }

    fn set_scroll_value(&mut self, value: i32) {
        TableView::set_scroll_value(self, value);
    }
}
