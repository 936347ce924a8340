//! Bidirectional binding between the viewport and a host scrollbar.
//!
//! The engine is both producer and consumer of the scrollbar: after every
//! rebind it pushes range, page step, thumb size and value derived from the
//! collection size and the visible-row count; when the user drags the thumb,
//! the host feeds the new value back through the view's `set_scroll_value`.

use super::viewport::Viewport;

/// The scrollbar-control boundary.
///
/// One scrollbar unit is one collection index; the value is the window's
/// start index.
pub trait ScrollbarAdapter: Send + Sync {
    /// Sets the inclusive value range.
    fn set_range(&mut self, min: i32, max: i32);

    /// Sets the page step (one window's worth of rows).
    fn set_page_step(&mut self, step: i32);

    /// Sets the thumb size as the visible fraction of the collection, in
    /// `0.0..=1.0`.
    fn set_thumb_ratio(&mut self, ratio: f32);

    /// Moves the thumb to `value`.
    fn set_value(&mut self, value: i32);

    /// The current thumb value.
    fn value(&self) -> i32;
}

/// Pushes viewport state into an optional scrollbar adapter.
#[derive(Default)]
pub struct ScrollSync {
    adapter: Option<Box<dyn ScrollbarAdapter>>,
}

impl ScrollSync {
    /// Creates a sync with no adapter attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the scrollbar adapter.
    pub fn set_adapter(&mut self, adapter: Box<dyn ScrollbarAdapter>) {
        self.adapter = Some(adapter);
    }

    /// Detaches and returns the adapter.
    pub fn take_adapter(&mut self) -> Option<Box<dyn ScrollbarAdapter>> {
        self.adapter.take()
    }

    /// Whether an adapter is attached.
    pub fn has_adapter(&self) -> bool {
        self.adapter.is_some()
    }

    /// Pushes range, page step, thumb size and value for the given viewport
    /// and collection length. No-op without an adapter.
    pub fn refresh(&mut self, viewport: &Viewport, len: usize) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        let max_start = viewport.max_start(len);
        adapter.set_range(0, max_start as i32);
        adapter.set_page_step(viewport.visible_rows().max(1) as i32);
        let ratio = if len == 0 {
            1.0
        } else {
            (viewport.visible_rows() as f32 / len as f32).min(1.0)
        };
        adapter.set_thumb_ratio(ratio);
        adapter.set_value(viewport.start() as i32);
    }
}

impl std::fmt::Debug for ScrollSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSync")
            .field("has_adapter", &self.adapter.is_some())
            .finish()
    }
}
