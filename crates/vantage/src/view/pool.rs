//! The recycled widget pool.
//!
//! A [`WidgetPool`] holds exactly one [`RowSlot`] per visible row. Slots are
//! created when the row count changes (reconfigure) and re-targeted in place
//! when the window slides or values change (rebind). A rebind never creates
//! or destroys a slot, which is what makes scrolling allocation-free.

use super::editor::ValueBinding;

/// One fixed pool position, bound to one window offset.
///
/// A slot whose window offset extends past the end of the collection is
/// marked invisible but stays bound to a neutral placeholder element, so its
/// editors never observe an unbound state.
#[derive(Debug)]
pub struct RowSlot {
    /// Text of the index column for this slot.
    index_text: String,
    /// Whether the slot shows a real element (false past the end).
    visible: bool,
    /// Whether the slot's row is selected.
    selected: bool,
    /// Whether the insert/delete affordances are shown for this slot.
    affordances: bool,
    /// One binding per value cell (one for plain lists, one per visible
    /// field for tables).
    cells: Vec<ValueBinding>,
}

impl RowSlot {
    /// Creates a slot over freshly created cell bindings.
    pub fn new(cells: Vec<ValueBinding>) -> Self {
        Self {
            index_text: String::new(),
            visible: false,
            selected: false,
            affordances: false,
            cells,
        }
    }

    /// Text of the index column.
    pub fn index_text(&self) -> &str {
        &self.index_text
    }

    /// Whether the slot shows a real element.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the slot's row is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the insert/delete affordances are shown.
    pub fn affordances_visible(&self) -> bool {
        self.affordances
    }

    /// The slot's cell bindings.
    pub fn cells(&self) -> &[ValueBinding] {
        &self.cells
    }

    /// A cell binding by position.
    pub fn cell(&self, cell: usize) -> Option<&ValueBinding> {
        self.cells.get(cell)
    }

    /// A cell binding by position, mutably.
    pub fn cell_mut(&mut self, cell: usize) -> Option<&mut ValueBinding> {
        self.cells.get_mut(cell)
    }

    pub(crate) fn set_index_text(&mut self, text: String) {
        self.index_text = text;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        for cell in &mut self.cells {
            cell.editor_mut().set_visible(visible);
        }
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        for cell in &mut self.cells {
            cell.editor_mut().set_selected(selected);
        }
    }

    pub(crate) fn set_affordances(&mut self, visible: bool) {
        self.affordances = visible;
    }
}

/// The fixed set of row slots plus the bookkeeping that decides between a
/// structural reconfigure and an in-place rebind.
#[derive(Debug, Default)]
pub struct WidgetPool {
    slots: Vec<RowSlot>,
    widgets_per_row: usize,
    source_stamp: u64,
    built: bool,
}

impl WidgetPool {
    /// Creates an empty, never-built pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pool must be structurally rebuilt before the next rebind:
    /// the visible-row count changed, the per-row widget count changed, the
    /// backing collection was replaced, or the pool was never built.
    pub fn needs_reconfigure(
        &self,
        visible_rows: usize,
        widgets_per_row: usize,
        source_stamp: u64,
    ) -> bool {
        !self.built
            || self.slots.len() != visible_rows
            || self.widgets_per_row != widgets_per_row
            || self.source_stamp != source_stamp
    }

    /// Whether the pool has ever been built.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slots.
    pub fn slots(&self) -> &[RowSlot] {
        &self.slots
    }

    /// A slot by pool row.
    pub fn slot(&self, row: usize) -> Option<&RowSlot> {
        self.slots.get(row)
    }

    /// A slot by pool row, mutably.
    pub fn slot_mut(&mut self, row: usize) -> Option<&mut RowSlot> {
        self.slots.get_mut(row)
    }

    /// Destroys all slots and rebuilds `visible_rows` of them through
    /// `make_slot`. Records the geometry the pool was built for.
    pub fn rebuild(
        &mut self,
        visible_rows: usize,
        widgets_per_row: usize,
        source_stamp: u64,
        mut make_slot: impl FnMut(usize) -> RowSlot,
    ) {
        self.slots.clear();
        self.slots.reserve_exact(visible_rows);
        for row in 0..visible_rows {
            self.slots.push(make_slot(row));
        }
        self.widgets_per_row = widgets_per_row;
        self.source_stamp = source_stamp;
        self.built = true;
        tracing::debug!(
            target: "vantage::view",
            rows = visible_rows,
            widgets_per_row,
            "widget pool rebuilt"
        );
    }

    /// Tears the pool down to the never-built state.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.widgets_per_row = 0;
        self.built = false;
    }
}
