//! Model layer: collection sources, cell values, selection, sort state.
//!
//! Views render data they do not own. The model layer defines the boundary
//! traits a backing collection implements ([`CollectionSource`] and the
//! element traits), the dynamic [`CellValue`] currency exchanged with editor
//! widgets, and the [`SelectionModel`] shared by both view variants.

mod cell;
mod selection;
mod sort;
mod source;

pub use cell::{CellKind, CellValue};
pub use selection::{SelectMode, SelectionModel};
pub use sort::{SortIndicator, SortSelectionPolicy, SortState};
pub use source::{
    CellElement, CollectionSource, Element, FieldDescriptor, FieldScope, OwnerHook, Record,
    VecSource,
};
