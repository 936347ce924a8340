//! Value editors: the opaque per-cell widget capability.
//!
//! The engine never constructs host widgets itself. It resolves an
//! [`EditorFactory`] from the [`EditorRegistry`] once per bind (keyed by the
//! cell kind, not probed per row) and keeps the returned [`ValueEditor`]
//! objects alive in the widget pool for as long as the row count stays the
//! same. Window slides re-point the existing editors at new elements; they
//! never recreate them.
//!
//! [`BufferEditor`] is the stock headless editor. It simply remembers what it
//! was last bound, which is all the engine's own tests and non-rendering
//! hosts need; GUI hosts register factories that wrap real widgets.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ViewError;
use crate::model::{CellKind, CellValue};

/// A live editor widget for one cell, owned by the widget pool.
///
/// Implementations wrap a host-toolkit widget handle. All state pushes are
/// idempotent; the engine calls them freely during rebinds.
pub trait ValueEditor: Send + Sync {
    /// Displays `value` in the editor.
    fn bind(&mut self, value: &CellValue);

    /// Reads the edited value back out of the editor.
    fn value(&self) -> CellValue;

    /// Shows or hides the editor. Hidden editors stay bound to a placeholder
    /// value; they never observe an unbound state.
    fn set_visible(&mut self, visible: bool);

    /// Applies or removes selection highlighting.
    fn set_selected(&mut self, selected: bool);

    /// Switches the editor between editable and display-only presentation.
    fn set_read_only(&mut self, read_only: bool);
}

/// Creates editors for one cell kind.
pub trait EditorFactory: Send + Sync {
    /// Creates an editor showing `value`.
    fn create(&self, value: &CellValue, read_only: bool) -> Box<dyn ValueEditor>;
}

/// Adapter turning a closure into an [`EditorFactory`], used by
/// [`EditorRegistry::register_fn`].
struct FnFactory<F>(F);

impl<F> EditorFactory for FnFactory<F>
where
    F: Fn(&CellValue, bool) -> Box<dyn ValueEditor> + Send + Sync,
{
    fn create(&self, value: &CellValue, read_only: bool) -> Box<dyn ValueEditor> {
        (self.0)(value, read_only)
    }
}

/// Maps cell kinds to editor factories.
///
/// The registry is consulted once per reconfigure, when the pool is built;
/// a kind with no registered factory falls back to [`BufferEditor`] with a
/// logged warning, so a missing registration degrades instead of failing.
pub struct EditorRegistry {
    factories: HashMap<CellKind, Arc<dyn EditorFactory>>,
    fallback: Arc<dyn EditorFactory>,
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorRegistry {
    /// Creates a registry with no registrations; every kind resolves to the
    /// [`BufferEditor`] fallback.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            fallback: Arc::new(BufferEditorFactory),
        }
    }

    /// Registers a factory for a cell kind, replacing any previous one.
    pub fn register(&mut self, kind: CellKind, factory: Arc<dyn EditorFactory>) {
        self.factories.insert(kind, factory);
    }

    /// Registers a closure factory for a cell kind.
    pub fn register_fn<F>(&mut self, kind: CellKind, factory: F)
    where
        F: Fn(&CellValue, bool) -> Box<dyn ValueEditor> + Send + Sync + 'static,
    {
        self.register(kind, Arc::new(FnFactory(factory)));
    }

    /// Resolves the factory for a kind, falling back to the headless buffer
    /// factory (with a logged warning) when none is registered.
    pub fn resolve(&self, kind: CellKind) -> Arc<dyn EditorFactory> {
        match self.factories.get(&kind) {
            Some(factory) => factory.clone(),
            None => {
                tracing::debug!(
                    target: "vantage::view",
                    ?kind,
                    "no editor factory registered, using buffer fallback"
                );
                self.fallback.clone()
            }
        }
    }

    /// Resolves the factory for a kind, reporting a missing registration
    /// instead of falling back.
    pub fn try_resolve(&self, kind: CellKind) -> crate::error::Result<Arc<dyn EditorFactory>> {
        self.factories
            .get(&kind)
            .cloned()
            .ok_or(ViewError::UnknownEditorKind(kind))
    }
}

/// Headless editor that remembers its bound state.
///
/// Used as the registry fallback and throughout the engine's tests.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferEditor {
    value: CellValue,
    visible: bool,
    selected: bool,
    read_only: bool,
}

impl BufferEditor {
    /// Creates a buffer editor showing `value`.
    pub fn new(value: CellValue, read_only: bool) -> Self {
        Self {
            value,
            visible: true,
            selected: false,
            read_only,
        }
    }

    /// Whether the editor is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the editor carries selection highlighting.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the editor is display-only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl ValueEditor for BufferEditor {
    fn bind(&mut self, value: &CellValue) {
        self.value = value.clone();
    }

    fn value(&self) -> CellValue {
        self.value.clone()
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

/// Factory for [`BufferEditor`].
pub struct BufferEditorFactory;

impl EditorFactory for BufferEditorFactory {
    fn create(&self, value: &CellValue, read_only: bool) -> Box<dyn ValueEditor> {
        Box::new(BufferEditor::new(value.clone(), read_only))
    }
}

/// Pairs one live editor with the (index, field) target it currently shows.
///
/// Bindings are created during reconfigure and re-targeted during rebinds;
/// the editor object inside survives every window slide.
pub struct ValueBinding {
    editor: Box<dyn ValueEditor>,
    index: usize,
    field: Option<usize>,
}

impl ValueBinding {
    /// Creates a binding over a freshly created editor.
    pub fn new(editor: Box<dyn ValueEditor>, index: usize, field: Option<usize>) -> Self {
        Self {
            editor,
            index,
            field,
        }
    }

    /// The collection index this binding currently shows.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The raw field index for record collections, `None` for plain elements.
    pub fn field(&self) -> Option<usize> {
        self.field
    }

    /// Re-points the binding at a new target and pushes the target's value
    /// into the editor.
    pub fn rebind(&mut self, index: usize, value: &CellValue) {
        self.index = index;
        self.editor.bind(value);
    }

    /// The live editor.
    pub fn editor(&self) -> &dyn ValueEditor {
        self.editor.as_ref()
    }

    /// The live editor, mutably.
    pub fn editor_mut(&mut self) -> &mut dyn ValueEditor {
        self.editor.as_mut()
    }
}

impl std::fmt::Debug for ValueBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueBinding")
            .field("index", &self.index)
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_fallback() {
        let registry = EditorRegistry::new();
        let factory = registry.resolve(CellKind::Text);
        let editor = factory.create(&CellValue::from("x"), false);
        assert_eq!(editor.value(), CellValue::from("x"));
    }

    #[test]
    fn test_try_resolve_reports_missing() {
        let registry = EditorRegistry::new();
        assert!(matches!(
            registry.try_resolve(CellKind::Int),
            Err(ViewError::UnknownEditorKind(CellKind::Int))
        ));
    }

    #[test]
    fn test_register_fn() {
        let mut registry = EditorRegistry::new();
        registry.register_fn(CellKind::Int, |value, read_only| {
            Box::new(BufferEditor::new(value.clone(), read_only))
        });
        assert!(registry.try_resolve(CellKind::Int).is_ok());

        let editor = registry
            .resolve(CellKind::Int)
            .create(&CellValue::Int(5), true);
        assert_eq!(editor.value(), CellValue::Int(5));
    }

    #[test]
    fn test_binding_rebind_keeps_editor() {
        let mut binding = ValueBinding::new(
            Box::new(BufferEditor::new(CellValue::Int(1), false)),
            0,
            None,
        );
        binding.rebind(4, &CellValue::Int(9));
        assert_eq!(binding.index(), 4);
        assert_eq!(binding.editor().value(), CellValue::Int(9));
    }

    #[test]
    fn test_buffer_editor_state() {
        let mut editor = BufferEditor::new(CellValue::Bool(true), false);
        editor.set_visible(false);
        editor.set_selected(true);
        editor.set_read_only(true);
        assert!(!editor.is_visible());
        assert!(editor.is_selected());
        assert!(editor.is_read_only());
    }
}
