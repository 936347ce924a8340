//! Vantage - data-bound, virtualized collection views for desktop GUI
//! toolkits.
//!
//! Vantage is the windowed collection-view engine behind editable list and
//! table widgets: given a shared handle to an ordered collection (or a
//! collection of structured records), it maintains a sliding window of
//! visible rows sized from the allocated pixel height, recycles a fixed pool
//! of editor widgets across scrolls, tracks a multi-index selection that
//! stays consistent under inserts, deletes and sorts, and performs
//! structural edits (insert, delete, duplicate, cut/copy/paste,
//! drag-reorder) on the backing collection.
//!
//! It is a toolkit extension, not a toolkit: widget construction, layout,
//! rendering, clipboard transport and key bindings stay with the host, which
//! plugs in through the trait boundaries in [`view`] and [`interchange`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vantage::prelude::*;
//!
//! let source = Arc::new(VecSource::new(vec![
//!     "north".to_string(),
//!     "south".to_string(),
//!     "east".to_string(),
//!     "west".to_string(),
//! ]));
//! let mut view = ListView::new(source);
//!
//! // The host reports its allocated height and measured row height.
//! view.resize(72.0, 24.0);
//! assert_eq!(view.visible_rows(), 3);
//!
//! // Scroll, select, edit.
//! view.set_scroll_value(1);
//! view.select_index(2, SelectMode::SelectOne);
//! view.insert_at(Some(0));
//! assert_eq!(view.len(), 5);
//! ```

pub mod error;
pub mod interchange;
pub mod model;
pub mod prelude;
pub mod view;

pub use error::{Result, ViewError};
pub use vantage_core::{ConnectionGuard, ConnectionId, Signal};
