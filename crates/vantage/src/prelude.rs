//! Prelude module for Vantage.
//!
//! This module re-exports the most commonly used types for convenient
//! importing:
//!
//! ```ignore
//! use vantage::prelude::*;
//! ```
//!
//! This provides access to:
//! - The two view variants (`ListView`, `TableView`) and their shared
//!   `CollectionView` surface
//! - The model boundary (`CollectionSource`, `VecSource`, element traits)
//! - Selection types (`SelectionModel`, `SelectMode`)
//! - The editor capability (`ValueEditor`, `EditorRegistry`)
//! - Interchange types (`TransferStore`, `TransferPayload`)

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use vantage_core::{ConnectionId, Signal};

// ============================================================================
// Model Boundary
// ============================================================================

pub use crate::model::{
    CellElement, CellKind, CellValue, CollectionSource, Element, FieldDescriptor, FieldScope,
    Record, VecSource,
};

// ============================================================================
// Selection and Sorting
// ============================================================================

pub use crate::model::{SelectMode, SelectionModel, SortIndicator, SortSelectionPolicy};

// ============================================================================
// Views
// ============================================================================

pub use crate::view::{
    CollectionView, EditorRegistry, HeaderCell, ListView, RowSlot, ScrollbarAdapter, TableView,
    ValueEditor, ViewOptions,
};

// ============================================================================
// Interchange
// ============================================================================

pub use crate::interchange::{
    DropDisposition, MemoryTransferStore, PasteDisposition, TransferPayload, TransferStore,
};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::ViewError;
