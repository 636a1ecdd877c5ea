//! Stroke Types
//!
//! A stroke is one continuous pointer gesture: an ordered point sequence plus
//! the draw/erase flag and its style. The serialized form matches the payload
//! the device service accepts on `POST /draw`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point on the canvas, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge
    pub x: f64,
    /// Vertical offset from the top edge
    pub y: f64,
}

impl Point {
    /// Create a point
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A captured stroke.
///
/// Fields are private: a stroke is immutable once captured, and transmission
/// works on clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    draw_mode: bool,
    stroke_color: String,
    stroke_width: f64,
    paths: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_timestamp: Option<i64>,
}

impl Stroke {
    /// Create an ink stroke with the default style (black, width 4)
    #[must_use]
    pub fn ink(points: Vec<Point>) -> Self {
        Self::new(true, points)
    }

    /// Create an erase stroke with the default style
    #[must_use]
    pub fn erase(points: Vec<Point>) -> Self {
        Self::new(false, points)
    }

    fn new(draw_mode: bool, points: Vec<Point>) -> Self {
        Self {
            draw_mode,
            stroke_color: "black".to_string(),
            stroke_width: 4.0,
            paths: points,
            start_timestamp: None,
            end_timestamp: None,
        }
    }

    /// Set colour and width
    #[must_use]
    pub fn with_style(mut self, color: impl Into<String>, width: f64) -> Self {
        self.stroke_color = color.into();
        self.stroke_width = width;
        self
    }

    /// Set capture timestamps (epoch milliseconds)
    #[must_use]
    pub fn with_timestamps(mut self, start: i64, end: i64) -> Self {
        self.start_timestamp = Some(start);
        self.end_timestamp = Some(end);
        self
    }

    /// Whether this stroke deposits ink
    #[must_use]
    pub fn is_ink(&self) -> bool {
        self.draw_mode
    }

    /// Stroke colour as given by the canvas
    #[must_use]
    pub fn color(&self) -> &str {
        &self.stroke_color
    }

    /// Stroke width in canvas pixels
    #[must_use]
    pub fn width(&self) -> f64 {
        self.stroke_width
    }

    /// Ordered points of the gesture
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.paths
    }

    /// Capture start, if recorded
    #[must_use]
    pub fn start_timestamp(&self) -> Option<i64> {
        self.start_timestamp
    }

    /// Capture end, if recorded
    #[must_use]
    pub fn end_timestamp(&self) -> Option<i64> {
        self.end_timestamp
    }

    /// Check that the point sequence is usable: non-empty and finite.
    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(Error::malformed("stroke has no points"));
        }
        if let Some(idx) = self.paths.iter().position(|p| !p.is_finite()) {
            return Err(Error::malformed(format!("point {idx} is not finite")));
        }
        Ok(())
    }
}

/// Keep ink strokes only, preserving relative order.
#[must_use]
pub fn ink_only<'a>(strokes: impl IntoIterator<Item = &'a Stroke>) -> Vec<Stroke> {
    strokes.into_iter().filter(|s| s.is_ink()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x0: f64, x1: f64) -> Vec<Point> {
        vec![Point::new(x0, 0.0), Point::new(x1, 10.0)]
    }

    #[test]
    fn test_wire_format() {
        let stroke = Stroke::ink(line(1.0, 2.0))
            .with_style("red", 2.5)
            .with_timestamps(100, 250);
        let json = serde_json::to_value(&stroke).unwrap();

        assert_eq!(json["drawMode"], true);
        assert_eq!(json["strokeColor"], "red");
        assert_eq!(json["strokeWidth"], 2.5);
        assert_eq!(json["paths"][1]["x"], 2.0);
        assert_eq!(json["startTimestamp"], 100);
        assert_eq!(json["endTimestamp"], 250);
    }

    #[test]
    fn test_timestamps_omitted_when_absent() {
        let json = serde_json::to_value(Stroke::erase(line(0.0, 1.0))).unwrap();
        assert_eq!(json["drawMode"], false);
        assert!(json.get("startTimestamp").is_none());
    }

    #[test]
    fn test_parse_canvas_payload() {
        let raw = r#"{"drawMode":true,"strokeColor":"black","strokeWidth":4,
                      "paths":[{"x":3,"y":4},{"x":5,"y":6}]}"#;
        let stroke: Stroke = serde_json::from_str(raw).unwrap();
        assert!(stroke.is_ink());
        assert_eq!(stroke.points().len(), 2);
        assert_eq!(stroke.width(), 4.0);
        assert_eq!(stroke.start_timestamp(), None);
    }

    #[test]
    fn test_validate() {
        assert!(Stroke::ink(line(0.0, 1.0)).validate().is_ok());

        let err = Stroke::ink(Vec::new()).validate().unwrap_err();
        assert_eq!(err.code(), "malformed_stroke");

        let err = Stroke::ink(vec![Point::new(f64::NAN, 0.0)]).validate().unwrap_err();
        assert!(err.to_string().contains("point 0"));
    }

    #[test]
    fn test_ink_only_preserves_order() {
        let strokes = vec![
            Stroke::ink(line(0.0, 1.0)),
            Stroke::erase(line(1.0, 2.0)),
            Stroke::ink(line(2.0, 3.0)),
        ];
        let ink = ink_only(&strokes);
        assert_eq!(ink, vec![strokes[0].clone(), strokes[2].clone()]);
    }
}
