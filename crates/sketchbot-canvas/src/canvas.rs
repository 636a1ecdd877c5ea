//! Canvas Capability
//!
//! The synchronization engine never looks inside the drawing surface. It
//! drives it through [`SketchCanvas`] and treats [`SketchCanvas::strokes`] as
//! the source of truth for content after undo/redo.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stroke::{Point, Stroke};

/// Drawing surface capability: capture, snapshot, undo, redo, clear, export.
pub trait SketchCanvas: Send {
    /// Start a gesture at `point`
    fn pointer_down(&mut self, point: Point);

    /// Extend the current gesture. Ignored when no gesture is active.
    fn pointer_move(&mut self, point: Point);

    /// Finish the current gesture and report the completed stroke.
    ///
    /// Returns `None` when no gesture was active or it captured no points.
    fn pointer_up(&mut self) -> Option<Stroke>;

    /// Replace the content with previously captured strokes (undoable)
    fn load_strokes(&mut self, strokes: Vec<Stroke>);

    /// Full current stroke list, ink and erase, in drawing order
    fn strokes(&self) -> Vec<Stroke>;

    /// Toggle erase mode; strokes started while it is on are erase strokes
    fn set_erase_mode(&mut self, erase: bool);

    /// Whether erase mode is active
    fn is_erase_mode(&self) -> bool;

    /// Remove all strokes; the clear itself can be undone
    fn clear(&mut self);

    /// Remove all strokes and drop the undo/redo history
    fn reset(&mut self);

    /// Step back one history entry. Returns `false` when there is nothing to undo.
    fn undo(&mut self) -> bool;

    /// Step forward one history entry. Returns `false` when there is nothing to redo.
    fn redo(&mut self) -> bool;

    /// Export the visible drawing as an SVG document
    fn export_svg(&self) -> Result<String>;
}

/// Canvas size and default pen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    /// Width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Pen width for new strokes
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Pen colour for new strokes
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    /// Paper colour; erase strokes are painted with it on export
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_width() -> u32 {
    1024
}

fn default_height() -> u32 {
    668
}

fn default_stroke_width() -> f64 {
    4.0
}

fn default_stroke_color() -> String {
    "black".to_string()
}

fn default_background() -> String {
    "white".to_string()
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            stroke_width: default_stroke_width(),
            stroke_color: default_stroke_color(),
            background: default_background(),
        }
    }
}

impl CanvasSettings {
    /// Set the canvas size
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the default pen
    #[must_use]
    pub fn with_pen(mut self, color: impl Into<String>, width: f64) -> Self {
        self.stroke_color = color.into();
        self.stroke_width = width;
        self
    }
}
