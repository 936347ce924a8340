//! View layer: the windowed collection-view engine.
//!
//! The engine is split along its moving parts:
//!
//! - [`Viewport`]: how many rows fit, and which index the window starts at
//! - [`WidgetPool`] / [`RowSlot`]: the fixed, recycled set of row widgets
//! - [`ValueEditor`] / [`EditorRegistry`]: the opaque per-cell editor
//!   capability and its per-kind factory registry
//! - [`ScrollbarAdapter`] / scroll sync: the scrollbar boundary
//! - [`ListView`] and [`TableView`]: the two [`CollectionView`] variants,
//!   composing the above with the selection model and mutation engine
//!
//! A resize or initial bind recomputes the viewport; if the visible-row
//! count changed the pool reconfigures (rebuilding row widgets), otherwise
//! it rebinds in place (reusing widgets, updating values and highlighting),
//! and the scrollbar range/thumb refreshes. Selection changes and structural
//! edits all funnel back into the same reconfigure-or-rebind decision.

mod base;
mod editor;
mod list_view;
mod pool;
mod scroll;
mod table_view;
mod viewport;

pub use base::{CollectionView, ViewOptions, ViewPhase};
pub use editor::{
    BufferEditor, BufferEditorFactory, EditorFactory, EditorRegistry, ValueBinding, ValueEditor,
};
pub use list_view::ListView;
pub use pool::{RowSlot, WidgetPool};
pub use scroll::{ScrollSync, ScrollbarAdapter};
pub use table_view::{HeaderCell, TableView};
pub use viewport::Viewport;
