//! Clipboard and drag interchange for collection elements.
//!
//! Copy, cut, paste, duplicate and drag-reorder all move elements through one
//! byte-oriented exchange format: a [`TransferPayload`] holding one
//! self-describing record per element, each encoded as indented JSON, tagged
//! with a format string so it can be identified among other formats on the
//! system clipboard or a drag payload.
//!
//! The engine never touches an application-global clipboard. Hosts hand in a
//! [`TransferStore`] explicitly; [`MemoryTransferStore`] is the stock
//! in-process implementation, and a host wrapping the system clipboard
//! implements the same trait.

use std::collections::HashMap;

use crate::error::ViewError;
use crate::model::Element;

/// The format tag for element payloads produced by this engine.
pub const TRANSFER_KIND: &str = "application/x-vantage+json";

/// A list of encoded elements plus the format tag identifying the encoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferPayload {
    kind: String,
    records: Vec<Vec<u8>>,
}

impl TransferPayload {
    /// Creates an empty payload with the given format tag.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            records: Vec::new(),
        }
    }

    /// The format tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The encoded records, one per element.
    pub fn records(&self) -> &[Vec<u8>] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the payload holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends an encoded record.
    pub fn push_record(&mut self, record: Vec<u8>) {
        self.records.push(record);
    }
}

/// Encodes elements into a payload, one indented JSON record per element.
pub fn encode_elements<T: Element>(items: &[T]) -> TransferPayload {
    let mut payload = TransferPayload::new(TRANSFER_KIND);
    for item in items {
        match serde_json::to_vec_pretty(item) {
            Ok(record) => payload.push_record(record),
            Err(err) => {
                tracing::error!(
                    target: "vantage::interchange",
                    %err,
                    "failed to encode element, skipping"
                );
            }
        }
    }
    payload
}

/// Decodes a payload back into elements.
///
/// A malformed record is skipped and logged; the rest of the payload still
/// decodes. A payload with a foreign format tag decodes to nothing.
pub fn decode_elements<T: Element>(payload: &TransferPayload) -> Vec<T> {
    if payload.kind() != TRANSFER_KIND {
        tracing::warn!(
            target: "vantage::interchange",
            found = payload.kind(),
            expected = TRANSFER_KIND,
            "ignoring payload with foreign format tag"
        );
        return Vec::new();
    }
    let mut items = Vec::with_capacity(payload.len());
    for record in payload.records() {
        match serde_json::from_slice::<T>(record) {
            Ok(item) => items.push(item),
            Err(err) => {
                tracing::warn!(
                    target: "vantage::interchange",
                    %err,
                    "skipping malformed transfer record"
                );
            }
        }
    }
    items
}

/// Strict variant of [`decode_elements`] for hosts that want the failure
/// instead of the skip-and-log behavior.
pub fn try_decode_elements<T: Element>(
    payload: &TransferPayload,
) -> crate::error::Result<Vec<T>> {
    if payload.kind() != TRANSFER_KIND {
        return Err(ViewError::KindMismatch {
            expected: TRANSFER_KIND.to_string(),
            found: payload.kind().to_string(),
        });
    }
    payload
        .records()
        .iter()
        .map(|record| serde_json::from_slice::<T>(record).map_err(ViewError::from))
        .collect()
}

/// Clipboard-like storage for transfer payloads, keyed by format tag.
///
/// Passed explicitly into copy/cut/paste/duplicate operations.
pub trait TransferStore: Send + Sync {
    /// Stores a payload under its format tag, replacing any previous payload
    /// of that format.
    fn write(&mut self, payload: TransferPayload);

    /// Reads the payload with the given format tag, if present.
    fn read(&self, kind: &str) -> Option<TransferPayload>;
}

/// In-process [`TransferStore`] holding payloads by format tag.
#[derive(Debug, Default)]
pub struct MemoryTransferStore {
    payloads: HashMap<String, TransferPayload>,
}

impl MemoryTransferStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransferStore for MemoryTransferStore {
    fn write(&mut self, payload: TransferPayload) {
        self.payloads.insert(payload.kind().to_string(), payload);
    }

    fn read(&self, kind: &str) -> Option<TransferPayload> {
        self.payloads.get(kind).cloned()
    }
}

/// How a completed drop resolves on the source side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropDisposition {
    /// The dragged elements are copied; the originals stay.
    Copy,
    /// The dragged elements move; the originals are removed after the drop.
    Move,
    /// The drag was cancelled; nothing changes.
    Cancel,
}

/// What a paste does with the payload at the target index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteDisposition {
    /// Overwrite the element at the index with the first record only.
    AssignTo,
    /// Insert the decoded elements before the index.
    InsertBefore,
    /// Insert the decoded elements after the index.
    InsertAfter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let items = vec!["alpha".to_string(), "beta".to_string()];
        let payload = encode_elements(&items);
        assert_eq!(payload.kind(), TRANSFER_KIND);
        assert_eq!(payload.len(), 2);
        let decoded: Vec<String> = decode_elements(&payload);
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_records_are_indented_json() {
        let items = vec![vec![1i64, 2, 3]];
        let payload = encode_elements(&items);
        let text = String::from_utf8(payload.records()[0].clone()).unwrap();
        // Pretty encoding spreads the array over multiple indented lines.
        assert!(text.contains('\n'));
        assert!(text.contains("  1"));
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let mut payload = encode_elements(&["ok".to_string()]);
        payload.push_record(b"{not json".to_vec());
        payload.push_record(serde_json::to_vec_pretty("also ok").unwrap());

        let decoded: Vec<String> = decode_elements(&payload);
        assert_eq!(decoded, vec!["ok".to_string(), "also ok".to_string()]);
    }

    #[test]
    fn test_foreign_kind_decodes_to_nothing() {
        let mut payload = TransferPayload::new("text/plain");
        payload.push_record(b"\"hello\"".to_vec());
        let decoded: Vec<String> = decode_elements(&payload);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_try_decode_reports_kind_mismatch() {
        let payload = TransferPayload::new("text/plain");
        let err = try_decode_elements::<String>(&payload).unwrap_err();
        assert!(matches!(err, ViewError::KindMismatch { .. }));
    }

    #[test]
    fn test_try_decode_reports_malformed_record() {
        let mut payload = TransferPayload::new(TRANSFER_KIND);
        payload.push_record(b"{not json".to_vec());
        let err = try_decode_elements::<String>(&payload).unwrap_err();
        assert!(matches!(err, ViewError::Decode(_)));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryTransferStore::new();
        let payload = encode_elements(&[7i64, 8]);
        store.write(payload.clone());

        assert_eq!(store.read(TRANSFER_KIND), Some(payload));
        assert_eq!(store.read("text/plain"), None);
    }
}
