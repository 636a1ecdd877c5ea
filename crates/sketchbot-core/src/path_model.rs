//! Path model
//!
//! Holds the transmittable path of the current session: ink strokes only, in
//! capture order. Erase strokes exist on the canvas for visual effect and
//! never enter this model.

use sketchbot_canvas::{ink_only, Stroke};
use tracing::debug;

/// Ordered ink strokes eligible for transmission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathModel {
    strokes: Vec<Stroke>,
}

impl PathModel {
    /// Create an empty path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a captured stroke at the tail.
    ///
    /// Returns `false` (and records nothing) for erase strokes and for
    /// strokes without a usable point sequence.
    pub fn append(&mut self, stroke: Stroke) -> bool {
        if !stroke.is_ink() {
            return false;
        }
        if let Err(e) = stroke.validate() {
            debug!(error = %e, "Ignoring malformed stroke");
            return false;
        }
        self.strokes.push(stroke);
        true
    }

    /// Replace the path with the ink strokes of a full canvas snapshot
    pub fn replace_from_canvas_snapshot(&mut self, strokes: &[Stroke]) {
        self.strokes = ink_only(strokes);
    }

    /// Empty the path
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Current path
    #[must_use]
    pub fn current(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Copy of the current path for transmission
    #[must_use]
    pub fn transmittable(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }

    /// Number of strokes
    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Whether the path is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
