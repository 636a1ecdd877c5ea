//! Device API trait
//!
//! Transport-level seam between the synchronization engine and the arm
//! controller service. `Err` means the call itself failed (network, HTTP
//! status, unreadable body); a [`Reply`] carries the semantic outcome the
//! service reported.

use async_trait::async_trait;
use sketchbot_canvas::Stroke;

use crate::error::Result;
use crate::types::{DeviceCommand, DevicePosition, Reply, SaveImageRequest};

/// Device controller operations
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// `GET /position`
    async fn position(&self) -> Result<Reply<DevicePosition>>;

    /// `POST /move` with a complete target position
    async fn move_to(&self, target: DevicePosition) -> Result<()>;

    /// `POST /command/{name}`
    async fn command(&self, command: DeviceCommand) -> Result<Reply<String>>;

    /// `POST /draw` with an array of strokes
    async fn draw(&self, strokes: &[Stroke]) -> Result<()>;

    /// `GET /get_image`; success carries the image identity
    async fn current_image(&self) -> Result<Reply<String>>;

    /// `POST /save_image`
    async fn save_image(&self, request: &SaveImageRequest) -> Result<Reply<String>>;
}
