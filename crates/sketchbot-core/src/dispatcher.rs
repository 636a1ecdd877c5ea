//! Command dispatcher
//!
//! Sends control commands, moves and paths to the device and converts every
//! outcome into exactly one operator notification. Failures are terminal for
//! the call that produced them: no retry, nothing propagates as fatal.

use sketchbot_canvas::{ink_only, Stroke};
use sketchbot_device::{DeviceApi, DeviceCommand, DevicePosition, Reply};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::DispatchError;
use crate::notify::{Category, Notifier};
use crate::position::PositionStore;

/// Device call front-end shared by the session controllers
#[derive(Clone)]
pub struct CommandDispatcher {
    device: Arc<dyn DeviceApi>,
    notifier: Arc<dyn Notifier>,
}

impl CommandDispatcher {
    /// Create a dispatcher over a device and a notification sink
    #[must_use]
    pub fn new(device: Arc<dyn DeviceApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { device, notifier }
    }

    /// Underlying device
    #[must_use]
    pub fn device(&self) -> &Arc<dyn DeviceApi> {
        &self.device
    }

    pub(crate) fn notify(&self, category: Category, message: impl Into<String>) {
        self.notifier.notify(category, message.into());
    }

    /// Send a named command, then re-sync position whatever the outcome.
    ///
    /// The reply `type` selects the notification category and its `message`
    /// is shown as-is.
    #[instrument(skip(self, positions))]
    pub async fn send_command(
        &self,
        command: DeviceCommand,
        positions: &mut PositionStore,
    ) -> Result<String, DispatchError> {
        let result = match self.device.command(command).await {
            Ok(Reply::Success(message)) => {
                self.notify(Category::Success, message.clone());
                Ok(message)
            }
            Ok(Reply::Error(message)) => {
                self.notify(Category::Error, message.clone());
                Err(DispatchError::semantic("error", message))
            }
            Ok(Reply::Other { kind, message }) => {
                self.notify(Category::Info, message.clone());
                Err(DispatchError::semantic(kind, message))
            }
            Err(e) => {
                warn!(error = %e, "Command failed");
                self.notify(Category::Error, format!("Command {command} failed: {e}"));
                Err(DispatchError::Transport(e))
            }
        };

        // any command may have physically moved the arm
        positions.refresh(self).await;
        result
    }

    /// Post a complete target position. Does not refresh position.
    #[instrument(skip(self))]
    pub async fn send_move(&self, target: DevicePosition) -> Result<(), DispatchError> {
        match self.device.move_to(target).await {
            Ok(()) => {
                self.notify(Category::Success, format!("Moving to {target}"));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Move failed");
                self.notify(Category::Error, format!("Move failed: {e}"));
                Err(DispatchError::Transport(e))
            }
        }
    }

    /// Post a path. Erase strokes are dropped at this boundary as well.
    ///
    /// Success is only logged: drawing happens asynchronously on the arm and
    /// does not change the known position.
    #[instrument(skip(self, path), fields(strokes = path.len()))]
    pub async fn send_path(&self, path: Vec<Stroke>) -> Result<(), DispatchError> {
        let ink = if path.iter().all(Stroke::is_ink) {
            path
        } else {
            warn!("Erase strokes reached the dispatcher; dropping them");
            ink_only(&path)
        };

        match self.device.draw(&ink).await {
            Ok(()) => {
                info!(strokes = ink.len(), "Path delivered");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Path send failed");
                self.notify(Category::Error, format!("Sending drawing failed: {e}"));
                Err(DispatchError::Transport(e))
            }
        }
    }

    /// Raw position query; the caller decides how to report it
    pub async fn query_position(
        &self,
    ) -> Result<Reply<DevicePosition>, sketchbot_device::Error> {
        self.device.position().await
    }
}
