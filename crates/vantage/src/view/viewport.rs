//! The sliding window of visible collection indices.
//!
//! A [`Viewport`] knows how many fixed-height rows fit in the space the host
//! layout allocated, and which collection index the first visible row shows.
//! It owns no widgets; the widget pool sizes itself from
//! [`visible_rows`](Viewport::visible_rows) after every resize.

/// Window geometry over the backing collection.
///
/// Invariants, maintained by [`resize`](Self::resize) and
/// [`clamp_start`](Self::clamp_start):
///
/// - `start <= max(0, len - visible_rows)` for the last clamped `len`
/// - `visible_rows == floor(avail_height / row_height)`, never negative,
///   except that a zero available height (a widget that has not been laid
///   out yet) keeps the previous count
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Collection index of the first visible row.
    start: usize,
    /// Number of rows that fit in the allocated height.
    visible_rows: usize,
    /// Measured height of a single row, in pixels.
    row_height: f32,
    /// Allocated height available for rows, in pixels.
    avail_height: f32,
    /// Minimum row count used for the widget's size hint.
    min_rows: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Viewport {
    /// Creates a viewport with the given minimum-rows hint and no measured
    /// geometry yet.
    pub fn new(min_rows: usize) -> Self {
        Self {
            start: 0,
            visible_rows: 0,
            row_height: 0.0,
            avail_height: 0.0,
            min_rows,
        }
    }

    /// Collection index of the first visible row.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of rows that fit in the allocated height.
    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Measured row height in pixels.
    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Minimum-rows hint.
    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    /// Minimum height the host should allocate, for widget size hints.
    pub fn min_height_hint(&self) -> f32 {
        self.row_height.max(1.0) * self.min_rows as f32
    }

    /// Recomputes the visible-row count from allocated height and measured
    /// row height. Returns `(visible_rows, changed)`.
    ///
    /// A zero (or negative) available height means the widget has not been
    /// laid out; the previous count is kept and `changed` is `false` so a
    /// transient layout state never collapses the pool. A non-positive row
    /// height is likewise ignored.
    pub fn resize(&mut self, avail_height: f32, row_height: f32) -> (usize, bool) {
        if avail_height <= 0.0 {
            return (self.visible_rows, false);
        }
        if row_height <= 0.0 {
            tracing::warn!(
                target: "vantage::view",
                row_height,
                "ignoring resize with non-positive row height"
            );
            return (self.visible_rows, false);
        }
        self.avail_height = avail_height;
        self.row_height = row_height;
        let rows = (avail_height / row_height).floor() as usize;
        let changed = rows != self.visible_rows;
        self.visible_rows = rows;
        (rows, changed)
    }

    /// Largest valid start index for a collection of `len` elements.
    pub fn max_start(&self, len: usize) -> usize {
        len.saturating_sub(self.visible_rows)
    }

    /// Clamps the start index into `[0, max_start(len)]`; when the whole
    /// collection fits, the window is forced to the top. Returns the clamped
    /// start. Called after any mutation or resize.
    pub fn clamp_start(&mut self, len: usize) -> usize {
        self.start = self.start.min(self.max_start(len));
        self.start
    }

    /// Sets the start index directly (from a scrollbar), clamped to range.
    pub fn set_start(&mut self, start: usize, len: usize) -> bool {
        let clamped = start.min(self.max_start(len));
        let moved = clamped != self.start;
        self.start = clamped;
        moved
    }

    /// Moves the window minimally so `index` falls inside it. Returns whether
    /// the window moved; if `index` is already visible this is a no-op.
    pub fn scroll_to(&mut self, index: usize, len: usize) -> bool {
        if self.visible_rows == 0 {
            return false;
        }
        let index = index.min(len.saturating_sub(1));
        if index < self.start {
            self.start = index;
            return true;
        }
        if index >= self.start + self.visible_rows {
            self.start = index + 1 - self.visible_rows;
            self.clamp_start(len);
            return true;
        }
        false
    }

    /// Whether `index` is inside the window.
    pub fn is_visible(&self, index: usize) -> bool {
        index >= self.start && index < self.start + self.visible_rows
    }

    /// The pool row showing `index`, if it is inside the window.
    pub fn row_of(&self, index: usize) -> Option<usize> {
        self.is_visible(index).then(|| index - self.start)
    }

    /// The collection index shown by pool row `row`.
    pub fn index_of(&self, row: usize) -> usize {
        self.start + row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(visible: usize, start: usize) -> Viewport {
        let mut vp = Viewport::new(4);
        vp.resize(visible as f32 * 20.0, 20.0);
        vp.start = start;
        vp
    }

    #[test]
    fn test_resize_floor_division() {
        let mut vp = Viewport::new(4);
        assert_eq!(vp.resize(100.0, 24.0), (4, true));
        assert_eq!(vp.resize(100.0, 24.0), (4, false));
        assert_eq!(vp.resize(47.9, 24.0), (1, true));
        assert_eq!(vp.resize(23.0, 24.0), (0, true));
    }

    #[test]
    fn test_resize_zero_height_keeps_previous() {
        let mut vp = Viewport::new(4);
        vp.resize(200.0, 20.0);
        assert_eq!(vp.visible_rows(), 10);
        // Not laid out yet: refuse to collapse.
        assert_eq!(vp.resize(0.0, 20.0), (10, false));
        assert_eq!(vp.visible_rows(), 10);
    }

    #[test]
    fn test_resize_bad_row_height_ignored() {
        let mut vp = Viewport::new(4);
        vp.resize(200.0, 20.0);
        assert_eq!(vp.resize(200.0, 0.0), (10, false));
    }

    #[test]
    fn test_clamp_start() {
        let mut vp = viewport(4, 9);
        assert_eq!(vp.clamp_start(10), 6);

        // Whole collection fits: window forced to the top.
        let mut vp = viewport(4, 2);
        assert_eq!(vp.clamp_start(3), 0);

        let mut vp = viewport(4, 5);
        assert_eq!(vp.clamp_start(0), 0);
    }

    #[test]
    fn test_window_invariant_across_sizes() {
        for len in [0usize, 1, 3, 4, 5, 100] {
            for start in [0usize, 2, 50, 1000] {
                let mut vp = viewport(4, start);
                let clamped = vp.clamp_start(len);
                assert!(clamped <= len.saturating_sub(vp.visible_rows()));
            }
        }
    }

    #[test]
    fn test_scroll_to_scenario() {
        // Collection size 10, 4 visible rows, start 0.
        let mut vp = viewport(4, 0);
        assert!(vp.scroll_to(9, 10));
        assert_eq!(vp.start(), 6);
        assert!(vp.scroll_to(0, 10));
        assert_eq!(vp.start(), 0);
    }

    #[test]
    fn test_scroll_to_inside_window_is_noop() {
        let mut vp = viewport(4, 3);
        assert!(!vp.scroll_to(5, 10));
        assert_eq!(vp.start(), 3);
    }

    #[test]
    fn test_scroll_to_with_empty_window() {
        let mut vp = Viewport::new(4);
        assert!(!vp.scroll_to(5, 10));
        assert_eq!(vp.start(), 0);
    }

    #[test]
    fn test_row_index_mapping() {
        let vp = viewport(4, 6);
        assert_eq!(vp.row_of(6), Some(0));
        assert_eq!(vp.row_of(9), Some(3));
        assert_eq!(vp.row_of(10), None);
        assert_eq!(vp.row_of(5), None);
        assert_eq!(vp.index_of(2), 8);
    }

    #[test]
    fn test_set_start_from_scrollbar() {
        let mut vp = viewport(4, 0);
        assert!(vp.set_start(3, 10));
        assert_eq!(vp.start(), 3);
        // Beyond range clamps.
        assert!(vp.set_start(50, 10));
        assert_eq!(vp.start(), 6);
        assert!(!vp.set_start(6, 10));
    }
}
