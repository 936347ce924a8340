//! Logging facilities for Vantage.
//!
//! Vantage uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber;
//!
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "vantage_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "vantage_core::signal";
    /// View engine target.
    pub const VIEW: &str = "vantage::view";
    /// Selection model target.
    pub const SELECTION: &str = "vantage::selection";
    /// Clipboard / drag interchange target.
    pub const INTERCHANGE: &str = "vantage::interchange";
}

/// Macros for common tracing patterns.
///
/// These are re-exported for convenience but are just wrappers around the
/// `tracing` crate macros with consistent target naming.
#[macro_export]
macro_rules! vantage_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "vantage", $($arg)*)
    };
}

#[macro_export]
macro_rules! vantage_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "vantage", $($arg)*)
    };
}

#[macro_export]
macro_rules! vantage_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "vantage", $($arg)*)
    };
}

#[macro_export]
macro_rules! vantage_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "vantage", $($arg)*)
    };
}

#[macro_export]
macro_rules! vantage_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "vantage", $($arg)*)
    };
}
