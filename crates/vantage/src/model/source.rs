//! Collection sources: the boundary between views and the data they display.
//!
//! A view never owns the collection it renders. It holds an
//! `Arc<S: CollectionSource>` shared with the embedding application, reads a
//! cached length before every index-using operation, and performs structural
//! edits through the source's interior mutability. [`VecSource`] is the stock
//! implementation backed by a `Vec<T>` behind a `parking_lot::RwLock`.
//!
//! # Element traits
//!
//! - [`Element`] is the base capability every viewable element needs:
//!   cloning, a neutral default (used both for blank inserts and for the
//!   placeholder bound to out-of-window widget slots), and serde support for
//!   the clipboard/drag interchange format.
//! - [`CellElement`] adds a single-cell editing surface, for plain list
//!   views.
//! - [`Record`] adds a named, ordered field list, for table views.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::cell::{CellKind, CellValue};

/// Base capability for elements shown in a collection view.
///
/// This is a blanket trait: any `Clone + Default + Serialize + DeserializeOwned`
/// type qualifies. `Default` provides the zero-value used for blank inserts
/// and for the placeholder that out-of-window slots stay bound to, and the
/// serde bounds carry the interchange (copy/paste, drag) encoding.
pub trait Element:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Element for T where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// An element that edits as a single cell, for plain list views.
pub trait CellElement: Element {
    /// The cell kind used to resolve an editor factory for this element type.
    fn cell_kind() -> CellKind;

    /// Surfaces the element's editable content.
    fn to_cell(&self) -> CellValue;

    /// Assigns edited content back to the element.
    ///
    /// Returns `false` (leaving the element unchanged) if the value's kind
    /// does not match.
    fn assign_cell(&mut self, value: &CellValue) -> bool;
}

impl CellElement for String {
    fn cell_kind() -> CellKind {
        CellKind::Text
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Text(self.clone())
    }

    fn assign_cell(&mut self, value: &CellValue) -> bool {
        match value {
            CellValue::Text(s) => {
                *self = s.clone();
                true
            }
            _ => false,
        }
    }
}

impl CellElement for bool {
    fn cell_kind() -> CellKind {
        CellKind::Bool
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Bool(*self)
    }

    fn assign_cell(&mut self, value: &CellValue) -> bool {
        match value {
            CellValue::Bool(b) => {
                *self = *b;
                true
            }
            _ => false,
        }
    }
}

impl CellElement for i64 {
    fn cell_kind() -> CellKind {
        CellKind::Int
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Int(*self)
    }

    fn assign_cell(&mut self, value: &CellValue) -> bool {
        match value {
            CellValue::Int(n) => {
                *self = *n;
                true
            }
            _ => false,
        }
    }
}

impl CellElement for i32 {
    fn cell_kind() -> CellKind {
        CellKind::Int
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Int(i64::from(*self))
    }

    fn assign_cell(&mut self, value: &CellValue) -> bool {
        match value {
            CellValue::Int(n) => match i32::try_from(*n) {
                Ok(v) => {
                    *self = v;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }
}

impl CellElement for f64 {
    fn cell_kind() -> CellKind {
        CellKind::Float
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Float(*self)
    }

    fn assign_cell(&mut self, value: &CellValue) -> bool {
        match value {
            CellValue::Float(f) => {
                *self = *f;
                true
            }
            _ => false,
        }
    }
}

/// Controls when a record field is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldScope {
    /// Shown in both editable and select-only views.
    #[default]
    Always,
    /// Shown only when the view is editable.
    EditOnly,
    /// Shown only when the view is a read-only selector.
    SelectOnly,
    /// Never shown.
    Hidden,
}

impl FieldScope {
    /// Whether a field with this scope is visible in a view with the given
    /// read-only state.
    pub fn visible(self, read_only_view: bool) -> bool {
        match self {
            Self::Always => true,
            Self::EditOnly => !read_only_view,
            Self::SelectOnly => read_only_view,
            Self::Hidden => false,
        }
    }
}

/// Describes one field of a [`Record`] type.
///
/// The full descriptor list of a record type is fixed; which fields are
/// visible depends on the view's read-only state and each field's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name, used for sort-state persistence.
    pub name: &'static str,
    /// Header label shown by the host; defaults to the name.
    pub label: &'static str,
    /// Cell kind, used to resolve the field's editor factory.
    pub kind: CellKind,
    /// When this field is shown.
    pub scope: FieldScope,
    /// Whether the field's editors are read-only even in an editable view.
    pub read_only: bool,
}

impl FieldDescriptor {
    /// Creates a descriptor with the given name and kind, visible everywhere.
    pub fn new(name: &'static str, kind: CellKind) -> Self {
        Self {
            name,
            label: name,
            kind,
            scope: FieldScope::Always,
            read_only: false,
        }
    }

    /// Sets the header label.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Sets the field scope.
    pub fn with_scope(mut self, scope: FieldScope) -> Self {
        self.scope = scope;
        self
    }

    /// Marks the field read-only.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// An element with named fields, for table views.
///
/// Field indices passed to [`field`](Record::field) and
/// [`set_field`](Record::set_field) index the full [`fields`](Record::fields)
/// list; views translate visible-column positions to these raw indices.
pub trait Record: Element {
    /// The full ordered field list for this record type.
    ///
    /// Must be identical for every instance; views call it once per bind.
    fn fields() -> Vec<FieldDescriptor>;

    /// Reads the field at `index`.
    fn field(&self, index: usize) -> CellValue;

    /// Writes the field at `index`.
    ///
    /// Returns `false` (leaving the record unchanged) if the index is out of
    /// range or the value's kind does not match.
    fn set_field(&mut self, index: usize, value: &CellValue) -> bool;
}

/// Constructs elements through the owner's own insertion capability, for
/// element types whose lifecycle is managed by an external owner rather than
/// zero-valued in place.
///
/// When a view has an owner hook, blank inserts delegate here instead of
/// inserting `Default::default()` directly.
pub trait OwnerHook<S: CollectionSource + ?Sized>: Send + Sync {
    /// Constructs and inserts `count` new elements at `position`.
    ///
    /// Returns the number of elements actually inserted (0 if the owner
    /// declined, e.g. the user cancelled the prompt).
    fn insert_new(&self, source: &S, position: usize, count: usize) -> usize;
}

/// The collection boundary used by views.
///
/// All methods take `&self`; implementations use interior mutability and are
/// shared with the embedding application via `Arc`. Out-of-range indices are
/// defensive no-ops, never panics; they arise routinely from concurrent
/// scroll/size changes.
pub trait CollectionSource: Send + Sync + 'static {
    /// The element type.
    type Elem: Element;

    /// Current number of elements.
    fn len(&self) -> usize;

    /// Whether the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clones out the element at `index`, or `None` if out of range.
    fn get(&self, index: usize) -> Option<Self::Elem>;

    /// Overwrites the element at `index`. Returns `false` if out of range.
    fn set(&self, index: usize, value: Self::Elem) -> bool;

    /// Inserts at `index` (`index == len` appends), shifting subsequent
    /// elements. Returns `false` if `index > len` or the collection is
    /// fixed-length.
    fn insert(&self, index: usize, value: Self::Elem) -> bool;

    /// Removes and returns the element at `index`, or `None` if out of range
    /// or the collection is fixed-length.
    fn remove(&self, index: usize) -> Option<Self::Elem>;

    /// Whether the collection is array-like: its length cannot change.
    /// Structural edits on fixed-length collections are silent no-ops.
    fn fixed_len(&self) -> bool {
        false
    }

    /// Generation stamp, bumped whenever the backing storage is replaced
    /// wholesale. Views use it to detect that a full reconfigure is needed.
    fn stamp(&self) -> u64;

    /// Stable in-place sort. Returns the applied permutation as a vector
    /// where `perm[new_index] == old_index` (empty when nothing moved is
    /// acceptable only for the empty collection).
    fn sort_with(&self, cmp: &mut dyn FnMut(&Self::Elem, &Self::Elem) -> Ordering)
    -> Vec<usize>;
}

/// Stock collection source backed by `Vec<T>`.
///
/// # Example
///
/// ```
/// use vantage::model::{CollectionSource, VecSource};
///
/// let source = VecSource::new(vec!["a".to_string(), "b".to_string()]);
/// assert_eq!(source.len(), 2);
/// source.insert(1, "c".to_string());
/// assert_eq!(source.get(1).as_deref(), Some("c"));
/// ```
pub struct VecSource<T> {
    items: RwLock<Vec<T>>,
    stamp: AtomicU64,
    fixed: bool,
}

impl<T: Element> VecSource<T> {
    /// Creates a source over the given items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            stamp: AtomicU64::new(1),
            fixed: false,
        }
    }

    /// Creates a fixed-length (array-like) source: element values may change,
    /// but inserts and removes are refused.
    pub fn fixed(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            stamp: AtomicU64::new(1),
            fixed: true,
        }
    }

    /// Replaces the backing storage wholesale and bumps the generation stamp.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items;
        self.stamp.fetch_add(1, AtomicOrdering::SeqCst);
    }

    /// Runs `f` over the current items without cloning.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.read())
    }

    /// Mutates the element at `index` in place. Returns `None` if out of
    /// range.
    pub fn modify<R>(&self, index: usize, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut items = self.items.write();
        items.get_mut(index).map(f)
    }
}

impl<T: Element> Default for VecSource<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Element> CollectionSource for VecSource<T> {
    type Elem = T;

    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    fn set(&self, index: usize, value: T) -> bool {
        let mut items = self.items.write();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn insert(&self, index: usize, value: T) -> bool {
        if self.fixed {
            return false;
        }
        let mut items = self.items.write();
        if index > items.len() {
            return false;
        }
        items.insert(index, value);
        true
    }

    fn remove(&self, index: usize) -> Option<T> {
        if self.fixed {
            return None;
        }
        let mut items = self.items.write();
        if index >= items.len() {
            return None;
        }
        Some(items.remove(index))
    }

    fn fixed_len(&self) -> bool {
        self.fixed
    }

    fn stamp(&self) -> u64 {
        self.stamp.load(AtomicOrdering::SeqCst)
    }

    fn sort_with(&self, cmp: &mut dyn FnMut(&T, &T) -> Ordering) -> Vec<usize> {
        let mut items = self.items.write();
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| cmp(&items[a], &items[b]));
        let sorted: Vec<T> = order.iter().map(|&old| items[old].clone()).collect();
        *items = sorted;
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let source = VecSource::new(vec![1i64, 2, 3]);
        assert!(source.insert(1, 9));
        assert_eq!(source.get(1), Some(9));
        assert_eq!(source.len(), 4);

        assert_eq!(source.remove(1), Some(9));
        assert_eq!(source.len(), 3);
        assert_eq!(source.get(1), Some(2));
    }

    #[test]
    fn test_insert_append_and_out_of_range() {
        let source = VecSource::new(vec![1i64]);
        assert!(source.insert(1, 2)); // index == len appends
        assert!(!source.insert(5, 3)); // beyond len refused
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_fixed_len_refuses_structural_edits() {
        let source = VecSource::fixed(vec![1i64, 2]);
        assert!(source.fixed_len());
        assert!(!source.insert(0, 9));
        assert_eq!(source.remove(0), None);
        // Value assignment is still allowed.
        assert!(source.set(0, 7));
        assert_eq!(source.get(0), Some(7));
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_set_items_bumps_stamp() {
        let source = VecSource::new(vec![1i64]);
        let before = source.stamp();
        source.set_items(vec![2, 3]);
        assert!(source.stamp() > before);
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_sort_with_is_stable_and_reports_permutation() {
        // Pairs sorted by first component; equal keys keep their order.
        let source = VecSource::new(vec![(2i64, 0i64), (1, 1), (2, 2), (1, 3)]);
        let perm = source.sort_with(&mut |a, b| a.0.cmp(&b.0));
        source.with_items(|items| {
            assert_eq!(items, &[(1, 1), (1, 3), (2, 0), (2, 2)]);
        });
        // perm[new] == old
        assert_eq!(perm, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_field_scope_visibility() {
        assert!(FieldScope::Always.visible(false));
        assert!(FieldScope::Always.visible(true));
        assert!(FieldScope::EditOnly.visible(false));
        assert!(!FieldScope::EditOnly.visible(true));
        assert!(!FieldScope::SelectOnly.visible(false));
        assert!(FieldScope::SelectOnly.visible(true));
        assert!(!FieldScope::Hidden.visible(false));
        assert!(!FieldScope::Hidden.visible(true));
    }

    #[test]
    fn test_cell_element_round_trip() {
        let mut s = String::from("old");
        assert!(s.assign_cell(&CellValue::from("new")));
        assert_eq!(s.to_cell(), CellValue::from("new"));
        // Kind mismatch leaves the element unchanged.
        assert!(!s.assign_cell(&CellValue::Int(3)));
        assert_eq!(s, "new");
    }
}
