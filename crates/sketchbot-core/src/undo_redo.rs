//! Undo/redo coordination
//!
//! The canvas owns history. After each step the path model is rebuilt from
//! the canvas snapshot, since undo can reintroduce strokes the path had
//! dropped and redo can remove ones it holds.

use sketchbot_canvas::SketchCanvas;
use tracing::debug;

use crate::path_model::PathModel;

/// Forwards history steps to the canvas and resyncs the path
#[derive(Debug, Clone, Copy, Default)]
pub struct UndoRedoController;

impl UndoRedoController {
    /// Undo one step. Returns `false` when the canvas had nothing to undo.
    pub fn undo(&self, canvas: &mut dyn SketchCanvas, path: &mut PathModel) -> bool {
        let stepped = canvas.undo();
        Self::resync(canvas, path);
        stepped
    }

    /// Redo one step. Returns `false` when the canvas had nothing to redo.
    pub fn redo(&self, canvas: &mut dyn SketchCanvas, path: &mut PathModel) -> bool {
        let stepped = canvas.redo();
        Self::resync(canvas, path);
        stepped
    }

    fn resync(canvas: &dyn SketchCanvas, path: &mut PathModel) {
        path.replace_from_canvas_snapshot(&canvas.strokes());
        debug!(strokes = path.len(), "Path resynced from canvas");
    }
}
