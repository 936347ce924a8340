//! Core systems for Vantage.
//!
//! This crate provides the foundational components of the Vantage
//! collection-view engine:
//!
//! - **Signal/Slot System**: Type-safe change notification between the view
//!   engine and its host application
//! - **Logging**: `tracing` targets and macros used across the workspace
//!
//! # Signal/Slot Example
//!
//! ```
//! use vantage_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
