//! Sketchbot Core - stroke capture and device synchronization
//!
//! This crate decides, for every captured stroke, whether and how it reaches
//! the plotting arm, and keeps the local view of the arm consistent:
//! - Path: `PathModel`, the transmittable ink-only path
//! - Position: `PositionStore`, last known arm position
//! - Dispatcher: `CommandDispatcher`, device calls and their notifications
//! - Transmission: aggressive/batched routing and outbound delivery
//! - Image: reference-image lifecycle with the confirm-before-save gate
//! - UndoRedo: canvas history with path resync
//! - Session: `DrawingSession`, the single owner tying it together
//!
//! ## Usage
//!
//! ```ignore
//! use sketchbot_canvas::{MemoryCanvas, Point};
//! use sketchbot_core::{CommandDispatcher, DrawingSession, NotificationBus, SessionConfig};
//! use sketchbot_device::{DeviceConfig, HttpDevice};
//! use std::sync::Arc;
//!
//! let bus = NotificationBus::default();
//! let device = HttpDevice::new(DeviceConfig::new().with_base_url("http://plotter.local:5000"))?;
//! let dispatcher = CommandDispatcher::new(Arc::new(device), Arc::new(bus.clone()));
//! let mut session = DrawingSession::new(SessionConfig::default(), dispatcher, Box::new(MemoryCanvas::default()));
//!
//! session.pointer_down(Point::new(10.0, 10.0));
//! session.pointer_move(Point::new(80.0, 40.0));
//! session.pointer_up(); // sent right away in aggressive mode
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatcher;
pub mod error;
pub mod image_workflow;
pub mod notify;
pub mod path_model;
pub mod position;
pub mod session;
pub mod transmission;
pub mod undo_redo;

// Re-export main types
pub use dispatcher::CommandDispatcher;
pub use error::{DispatchError, Error, Result};
pub use image_workflow::{ImageState, ImageWorkflowController};
pub use notify::{Category, Notification, NotificationBus, Notifier};
pub use path_model::PathModel;
pub use position::PositionStore;
pub use session::{DrawingSession, SessionConfig};
pub use transmission::{Delivery, Outbound, TransmissionController, TransmissionMode};
pub use undo_redo::UndoRedoController;
