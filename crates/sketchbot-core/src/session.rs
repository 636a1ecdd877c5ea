//! Drawing session
//!
//! Single owner of all session state. Every operator action is a method on
//! [`DrawingSession`] taking `&mut self`, so state is never shared and needs
//! no locks; only outbound path sends run in the background.

use serde::{Deserialize, Serialize};
use sketchbot_canvas::{Point, SketchCanvas, Stroke};
use sketchbot_device::{Axis, DeviceCommand, DevicePosition};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::dispatcher::CommandDispatcher;
use crate::error::{DispatchError, Result};
use crate::image_workflow::{ImageState, ImageWorkflowController};
use crate::notify::Category;
use crate::path_model::PathModel;
use crate::position::PositionStore;
use crate::transmission::{Delivery, Outbound, TransmissionController, TransmissionMode};
use crate::undo_redo::UndoRedoController;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial transmission mode
    #[serde(default)]
    pub transmission_mode: TransmissionMode,
    /// Outbound scheduling policy
    #[serde(default)]
    pub delivery: Delivery,
    /// Lowest value accepted from axis input
    #[serde(default = "default_min_axis_value")]
    pub min_axis_value: i32,
    /// Notifications buffered per subscriber
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

fn default_min_axis_value() -> i32 {
    -70
}

fn default_notification_capacity() -> usize {
    64
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transmission_mode: TransmissionMode::default(),
            delivery: Delivery::default(),
            min_axis_value: default_min_axis_value(),
            notification_capacity: default_notification_capacity(),
        }
    }
}

impl SessionConfig {
    /// Set the initial transmission mode
    #[must_use]
    pub fn with_transmission_mode(mut self, mode: TransmissionMode) -> Self {
        self.transmission_mode = mode;
        self
    }

    /// Set the delivery policy
    #[must_use]
    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }
}

/// One operator's drawing session against one device
pub struct DrawingSession {
    config: SessionConfig,
    dispatcher: CommandDispatcher,
    canvas: Box<dyn SketchCanvas>,
    path: PathModel,
    positions: PositionStore,
    transmission: TransmissionController,
    outbound: Outbound,
    images: ImageWorkflowController,
    history: UndoRedoController,
}

impl DrawingSession {
    /// Create a session. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        dispatcher: CommandDispatcher,
        canvas: Box<dyn SketchCanvas>,
    ) -> Self {
        info!(
            mode = %config.transmission_mode,
            delivery = ?config.delivery,
            "Starting drawing session"
        );
        Self {
            transmission: TransmissionController::new(config.transmission_mode),
            outbound: Outbound::new(config.delivery, dispatcher.clone()),
            config,
            dispatcher,
            canvas,
            path: PathModel::new(),
            positions: PositionStore::new(),
            images: ImageWorkflowController::new(),
            history: UndoRedoController,
        }
    }

    // ------------------------------------------------------------------
    // Stroke capture
    // ------------------------------------------------------------------

    /// Pointer pressed
    pub fn pointer_down(&mut self, point: Point) {
        self.canvas.pointer_down(point);
    }

    /// Pointer dragged
    pub fn pointer_move(&mut self, point: Point) {
        self.canvas.pointer_move(point);
    }

    /// Pointer released. Records the completed stroke and, in aggressive
    /// mode, queues it for the device.
    pub fn pointer_up(&mut self) -> Option<Stroke> {
        let stroke = self.canvas.pointer_up()?;
        if self.path.append(stroke.clone()) {
            if let Some(path) = self.transmission.on_stroke(&stroke) {
                self.outbound.submit(path);
            }
        }
        Some(stroke)
    }

    /// Replace the canvas with saved strokes. Nothing is transmitted.
    pub fn load_strokes(&mut self, strokes: Vec<Stroke>) {
        self.canvas.load_strokes(strokes);
        self.path
            .replace_from_canvas_snapshot(&self.canvas.strokes());
    }

    /// Set erase mode
    pub fn set_erase_mode(&mut self, erase: bool) {
        self.canvas.set_erase_mode(erase);
    }

    /// Flip erase mode, returning the new value
    pub fn toggle_erase_mode(&mut self) -> bool {
        let erase = !self.canvas.is_erase_mode();
        self.canvas.set_erase_mode(erase);
        erase
    }

    /// Whether new strokes erase
    #[must_use]
    pub fn erase_mode(&self) -> bool {
        self.canvas.is_erase_mode()
    }

    // ------------------------------------------------------------------
    // Transmission
    // ------------------------------------------------------------------

    /// Current transmission mode
    #[must_use]
    pub fn transmission_mode(&self) -> TransmissionMode {
        self.transmission.mode()
    }

    /// Set the transmission mode
    pub fn set_transmission_mode(&mut self, mode: TransmissionMode) {
        self.transmission.set_mode(mode);
    }

    /// Flip the transmission mode, returning the new mode
    pub fn toggle_transmission_mode(&mut self) -> TransmissionMode {
        self.transmission.toggle()
    }

    /// Queue the whole path as one send. Returns `false` when the path is
    /// empty, in which case nothing is sent.
    pub fn send_drawing(&mut self) -> bool {
        match self.transmission.send_drawing(&self.path) {
            Some(path) => {
                debug!(strokes = path.len(), "Sending drawing");
                self.outbound.submit(path);
                true
            }
            None => {
                self.dispatcher
                    .notify(Category::Info, "Nothing to send: the drawing is empty");
                false
            }
        }
    }

    /// Wait for every queued send to be attempted
    pub async fn flush(&mut self) {
        self.outbound.flush().await;
    }

    /// Sends not yet finished
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.outbound.in_flight()
    }

    // ------------------------------------------------------------------
    // Canvas history
    // ------------------------------------------------------------------

    /// Undo one canvas step
    pub fn undo(&mut self) -> bool {
        self.history.undo(self.canvas.as_mut(), &mut self.path)
    }

    /// Redo one canvas step
    pub fn redo(&mut self) -> bool {
        self.history.redo(self.canvas.as_mut(), &mut self.path)
    }

    /// Clear the drawing (undoable on the canvas)
    pub fn clear_canvas(&mut self) {
        self.canvas.clear();
        self.path.clear();
    }

    /// Clear the drawing and forget canvas history
    pub fn reset_canvas(&mut self) {
        self.canvas.reset();
        self.path.clear();
    }

    // ------------------------------------------------------------------
    // Device control
    // ------------------------------------------------------------------

    /// Run a named device command, then refresh position
    pub async fn command(&mut self, command: DeviceCommand) -> std::result::Result<String, DispatchError> {
        self.dispatcher
            .send_command(command, &mut self.positions)
            .await
    }

    /// Re-read position from the device
    pub async fn refresh_position(&mut self) -> Option<DevicePosition> {
        self.positions.refresh(&self.dispatcher).await
    }

    /// Change one axis and move there
    pub async fn update_axis(&mut self, axis: Axis, value: i32) -> Result<DevicePosition> {
        self.positions
            .update_axis(axis, value, &self.dispatcher)
            .await
    }

    // ------------------------------------------------------------------
    // Reference image
    // ------------------------------------------------------------------

    /// Fetch the current reference image; clears the drawing on success
    pub async fn fetch_image(&mut self) -> Result<Option<String>> {
        self.images
            .fetch(&self.dispatcher, self.canvas.as_mut(), &mut self.path)
            .await
    }

    /// Open the save confirmation
    pub fn open_save_confirmation(&mut self) -> Result<()> {
        self.images.open_save_confirmation()
    }

    /// Dismiss the save confirmation
    pub fn cancel_save(&mut self) {
        self.images.cancel_save();
    }

    /// Save the drawing under the current image
    pub async fn confirm_save(&mut self) -> Result<()> {
        self.images
            .confirm_save(&self.dispatcher, self.canvas.as_mut(), &mut self.path)
            .await
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Dispatcher shared with background sends
    #[must_use]
    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// Transmittable path
    #[must_use]
    pub fn path(&self) -> &PathModel {
        &self.path
    }

    /// Drawing surface
    #[must_use]
    pub fn canvas(&self) -> &dyn SketchCanvas {
        self.canvas.as_ref()
    }

    /// Last known device position
    #[must_use]
    pub fn position(&self) -> Option<DevicePosition> {
        self.positions.current()
    }

    /// Observe device position changes
    #[must_use]
    pub fn position_updates(&self) -> watch::Receiver<Option<DevicePosition>> {
        self.positions.subscribe()
    }

    /// Reference image state
    #[must_use]
    pub fn image_state(&self) -> &ImageState {
        self.images.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationBus;
    use sketchbot_canvas::MemoryCanvas;
    use sketchbot_device::MockDevice;
    use std::sync::Arc;

    fn session(config: SessionConfig) -> (DrawingSession, MockDevice) {
        let device = MockDevice::new();
        let dispatcher = CommandDispatcher::new(
            Arc::new(device.clone()),
            Arc::new(NotificationBus::default()),
        );
        (
            DrawingSession::new(config, dispatcher, Box::new(MemoryCanvas::default())),
            device,
        )
    }

    #[test]
    fn test_config_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.min_axis_value, -70);
        assert_eq!(config.notification_capacity, 64);
        assert_eq!(config.transmission_mode, TransmissionMode::Aggressive);
        assert_eq!(config.delivery, Delivery::Concurrent);
    }

    #[tokio::test]
    async fn test_load_strokes_is_not_transmitted() {
        let (mut session, device) = session(SessionConfig::default());
        session.load_strokes(vec![
            Stroke::ink(vec![Point::new(1.0, 1.0)]),
            Stroke::erase(vec![Point::new(2.0, 2.0)]),
        ]);
        session.flush().await;

        assert_eq!(session.path().len(), 1);
        assert!(device.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_reset_empty_the_path() {
        let (mut session, _device) = session(
            SessionConfig::default().with_transmission_mode(TransmissionMode::Batched),
        );
        session.pointer_down(Point::new(0.0, 0.0));
        session.pointer_up();
        session.clear_canvas();
        assert!(session.path().is_empty());
        assert!(session.undo());
        assert_eq!(session.path().len(), 1);

        session.reset_canvas();
        assert!(session.path().is_empty());
        assert!(!session.undo());
    }

    #[tokio::test]
    async fn test_toggle_erase_mode() {
        let (mut session, _device) = session(SessionConfig::default());
        assert!(!session.erase_mode());
        assert!(session.toggle_erase_mode());
        assert!(session.erase_mode());
    }
}
