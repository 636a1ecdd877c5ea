//! In-memory canvas
//!
//! One live stroke list plus an edit log. Each log entry is the inverse of an
//! edit already applied, so every stroke is held exactly once: either live or
//! inside a single undo/redo entry.

use chrono::Utc;
use std::mem;
use tracing::debug;

use crate::canvas::{CanvasSettings, SketchCanvas};
use crate::error::Result;
use crate::stroke::{Point, Stroke};
use crate::svg;

struct Gesture {
    draw_mode: bool,
    started_at: i64,
    points: Vec<Point>,
}

/// A reversible change to the live stroke list
enum Edit {
    /// Append a stroke
    Add(Stroke),
    /// Drop the last stroke
    Remove,
    /// Swap in a whole stroke list (clear, load)
    Replace(Vec<Stroke>),
}

/// Canvas that keeps strokes in memory
pub struct MemoryCanvas {
    settings: CanvasSettings,
    strokes: Vec<Stroke>,
    undo_log: Vec<Edit>,
    redo_log: Vec<Edit>,
    erase_mode: bool,
    gesture: Option<Gesture>,
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        Self::new(CanvasSettings::default())
    }
}

impl MemoryCanvas {
    /// Create an empty canvas
    #[must_use]
    pub fn new(settings: CanvasSettings) -> Self {
        Self {
            settings,
            strokes: Vec::new(),
            undo_log: Vec::new(),
            redo_log: Vec::new(),
            erase_mode: false,
            gesture: None,
        }
    }

    /// Canvas settings
    #[must_use]
    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    /// Whether an undo step is available
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_log.is_empty()
    }

    /// Whether a redo step is available
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_log.is_empty()
    }

    /// Record the inverse of an edit just applied; a new edit drops the redo tail
    fn record(&mut self, inverse: Edit) {
        self.redo_log.clear();
        self.undo_log.push(inverse);
    }

    /// Apply `edit` to the live list and return its inverse
    fn apply(&mut self, edit: Edit) -> Edit {
        match edit {
            Edit::Add(stroke) => {
                self.strokes.push(stroke);
                Edit::Remove
            }
            Edit::Remove => match self.strokes.pop() {
                Some(stroke) => Edit::Add(stroke),
                None => Edit::Remove,
            },
            Edit::Replace(strokes) => Edit::Replace(mem::replace(&mut self.strokes, strokes)),
        }
    }

    #[cfg(test)]
    fn retained_strokes(&self) -> usize {
        fn logged(log: &[Edit]) -> usize {
            log.iter()
                .map(|edit| match edit {
                    Edit::Add(_) => 1,
                    Edit::Remove => 0,
                    Edit::Replace(strokes) => strokes.len(),
                })
                .sum()
        }
        self.strokes.len() + logged(&self.undo_log) + logged(&self.redo_log)
    }
}

impl SketchCanvas for MemoryCanvas {
    fn pointer_down(&mut self, point: Point) {
        self.gesture = Some(Gesture {
            draw_mode: !self.erase_mode,
            started_at: Utc::now().timestamp_millis(),
            points: vec![point],
        });
    }

    fn pointer_move(&mut self, point: Point) {
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.points.push(point);
        }
    }

    fn pointer_up(&mut self) -> Option<Stroke> {
        let gesture = self.gesture.take()?;
        if gesture.points.is_empty() {
            return None;
        }

        let points = gesture.points;
        let stroke = if gesture.draw_mode {
            Stroke::ink(points)
        } else {
            Stroke::erase(points)
        };
        let stroke = stroke
            .with_style(self.settings.stroke_color.clone(), self.settings.stroke_width)
            .with_timestamps(gesture.started_at, Utc::now().timestamp_millis());

        debug!(
            ink = stroke.is_ink(),
            points = stroke.points().len(),
            "Stroke captured"
        );
        let inverse = self.apply(Edit::Add(stroke.clone()));
        self.record(inverse);
        Some(stroke)
    }

    fn load_strokes(&mut self, strokes: Vec<Stroke>) {
        self.gesture = None;
        let inverse = self.apply(Edit::Replace(strokes));
        self.record(inverse);
    }

    fn strokes(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }

    fn set_erase_mode(&mut self, erase: bool) {
        self.erase_mode = erase;
    }

    fn is_erase_mode(&self) -> bool {
        self.erase_mode
    }

    fn clear(&mut self) {
        self.gesture = None;
        if !self.strokes.is_empty() {
            let inverse = self.apply(Edit::Replace(Vec::new()));
            self.record(inverse);
        }
    }

    fn reset(&mut self) {
        self.gesture = None;
        self.strokes.clear();
        self.undo_log.clear();
        self.redo_log.clear();
    }

    fn undo(&mut self) -> bool {
        let Some(edit) = self.undo_log.pop() else {
            return false;
        };
        let inverse = self.apply(edit);
        self.redo_log.push(inverse);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(edit) = self.redo_log.pop() else {
            return false;
        };
        let inverse = self.apply(edit);
        self.undo_log.push(inverse);
        true
    }

    fn export_svg(&self) -> Result<String> {
        svg::render(&self.strokes, &self.settings)
    }
}
