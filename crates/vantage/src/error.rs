//! Error types for Vantage.
//!
//! Nothing in the view engine is fatal: out-of-range indices clamp, stale
//! pool state self-heals, malformed transfer records are skipped and logged,
//! and unsupported operations degrade to no-ops. These types exist for hosts
//! that want to observe the few reportable conditions directly (editor
//! registry lookups, interchange decoding).

use thiserror::Error;

use crate::model::CellKind;

/// Errors reportable by the view engine's fallible entry points.
#[derive(Debug, Error)]
pub enum ViewError {
    /// No editor factory is registered for a cell kind.
    #[error("no editor factory registered for {0:?} cells")]
    UnknownEditorKind(CellKind),

    /// A transfer payload carried an unexpected format tag.
    #[error("transfer payload kind {found:?} does not match {expected:?}")]
    KindMismatch {
        /// The format tag this engine encodes and decodes.
        expected: String,
        /// The tag found on the payload.
        found: String,
    },

    /// A transfer record failed to decode.
    #[error("malformed transfer record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A specialized `Result` type for Vantage operations.
pub type Result<T> = std::result::Result<T, ViewError>;
