//! Sketchbot Canvas - stroke model and canvas capability
//!
//! This crate provides the drawing-surface side of Sketchbot:
//! - Stroke: captured pointer gestures (ink or erase) and their wire format
//! - Canvas: the `SketchCanvas` capability the synchronization engine drives
//! - Memory: an in-memory canvas with snapshot history (undo/redo/clear)
//! - Svg: vector export of the current stroke list
//! - Error: Error types for canvas operations
//!
//! ## Usage
//!
//! ```ignore
//! use sketchbot_canvas::{CanvasSettings, MemoryCanvas, Point, SketchCanvas};
//!
//! let mut canvas = MemoryCanvas::new(CanvasSettings::default());
//! canvas.pointer_down(Point::new(10.0, 10.0));
//! canvas.pointer_move(Point::new(40.0, 25.0));
//! let stroke = canvas.pointer_up().expect("completed stroke");
//! assert!(stroke.is_ink());
//!
//! let svg = canvas.export_svg()?;
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [canvas]
//! width = 1024
//! height = 668
//! stroke_width = 4.0
//! stroke_color = "black"
//! background = "white"
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod canvas;
pub mod error;
pub mod memory;
pub mod stroke;
pub mod svg;

// Re-export main types
pub use canvas::{CanvasSettings, SketchCanvas};
pub use error::{Error, Result};
pub use memory::MemoryCanvas;
pub use stroke::{ink_only, Point, Stroke};
