//! Column sort state for table views.

use serde::{Deserialize, Serialize};

/// What happens to the selection when the collection is sorted.
///
/// The selected set stores positions. Sorting moves elements between
/// positions, so the two cannot both be preserved; this choice is explicit
/// configuration rather than an accident of implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortSelectionPolicy {
    /// Selected positions stay fixed; after a sort, different elements end
    /// up selected.
    #[default]
    PreservePositions,
    /// The selection is remapped through the sort permutation so the same
    /// elements stay selected at their new positions.
    PreserveElements,
}

/// Sort indicator shown on a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortIndicator {
    /// Not the active sort column.
    #[default]
    None,
    /// Active, ascending.
    Ascending,
    /// Active, descending.
    Descending,
}

/// The active sort column and direction of a table view.
///
/// `field` indexes the view's visible-field list; `None` means unsorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    /// Visible-field index of the active sort column.
    pub field: Option<usize>,
    /// Whether the active sort order is descending.
    pub descending: bool,
}

impl SortState {
    /// Records a sort request for `field`: a repeated request on the active
    /// column toggles the direction, a new column starts ascending.
    pub fn request(&mut self, field: usize) {
        if self.field == Some(field) {
            self.descending = !self.descending;
        } else {
            self.field = Some(field);
            self.descending = false;
        }
    }

    /// The indicator for a given visible-field index.
    pub fn indicator(&self, field: usize) -> SortIndicator {
        if self.field != Some(field) {
            SortIndicator::None
        } else if self.descending {
            SortIndicator::Descending
        } else {
            SortIndicator::Ascending
        }
    }
}
