//! Scroll position signals.
//!
//! Whatever hosts the rendered list (a browser, a terminal pager, a test)
//! reports its scroll position as [`ScrollMetrics`]. The feed only needs to
//! know whether the bottom of the document is close to the bottom of the
//! viewport.

/// A snapshot of the viewport relative to the rendered document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Position of the document's bottom edge, measured from the top of the
    /// viewport. Shrinks as the user scrolls down.
    pub document_bottom: f64,
    /// Height of the viewport.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Create a new scroll snapshot.
    #[must_use]
    pub fn new(document_bottom: f64, viewport_height: f64) -> Self {
        Self {
            document_bottom,
            viewport_height,
        }
    }

    /// A snapshot of a viewport scrolled all the way down.
    #[must_use]
    pub fn at_bottom(viewport_height: f64) -> Self {
        Self::new(viewport_height, viewport_height)
    }

    /// Whether the document's bottom is within `margin` of the viewport's bottom.
    #[must_use]
    pub fn is_near_bottom(&self, margin: f64) -> bool {
        self.document_bottom < self.viewport_height + margin
    }
}
