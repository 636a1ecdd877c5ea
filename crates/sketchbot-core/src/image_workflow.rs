//! Reference image workflow
//!
//! Tracing over a reference image ends in an irreversible commit: the SVG of
//! the drawing is posted under the image's name. The commit is only reachable
//! through an explicit confirmation step, and each confirmation allows one
//! save attempt.

use sketchbot_canvas::SketchCanvas;
use sketchbot_device::{Reply, SaveImageRequest};
use tracing::{info, instrument, warn};

use crate::dispatcher::CommandDispatcher;
use crate::error::{DispatchError, Error, Result};
use crate::notify::Category;
use crate::path_model::PathModel;

/// Image lifecycle state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageState {
    /// No reference image
    #[default]
    NoImage,
    /// An image is loaded for tracing
    ImageLoaded {
        /// Image identity as reported by the device service
        image: String,
    },
    /// The confirmation dialog is open
    AwaitingSaveConfirmation {
        /// Image identity as reported by the device service
        image: String,
    },
}

impl ImageState {
    /// Current image identity, if any
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::NoImage => None,
            Self::ImageLoaded { image } | Self::AwaitingSaveConfirmation { image } => Some(image),
        }
    }

    /// Whether the save control may be offered
    #[must_use]
    pub fn save_enabled(&self) -> bool {
        matches!(self, Self::ImageLoaded { .. })
    }

    /// Whether the confirmation dialog is open
    #[must_use]
    pub fn confirm_gate_open(&self) -> bool {
        matches!(self, Self::AwaitingSaveConfirmation { .. })
    }
}

/// Drives [`ImageState`] transitions against the device
#[derive(Debug, Default)]
pub struct ImageWorkflowController {
    state: ImageState,
}

impl ImageWorkflowController {
    /// Create a controller with no image
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> &ImageState {
        &self.state
    }

    /// Ask the device service for the current reference image.
    ///
    /// On success the canvas and path are cleared before the image is
    /// considered loaded. Any non-success answer leaves no image.
    #[instrument(skip_all)]
    pub async fn fetch(
        &mut self,
        dispatcher: &CommandDispatcher,
        canvas: &mut dyn SketchCanvas,
        path: &mut PathModel,
    ) -> Result<Option<String>> {
        match dispatcher.device().current_image().await {
            Ok(Reply::Success(image)) => {
                canvas.reset();
                path.clear();
                info!(%image, "Reference image loaded");
                dispatcher.notify(Category::Success, format!("Loaded image {image}"));
                self.state = ImageState::ImageLoaded {
                    image: image.clone(),
                };
                Ok(Some(image))
            }
            Ok(Reply::Other { message, .. }) => {
                self.state = ImageState::NoImage;
                dispatcher.notify(Category::Info, message);
                Ok(None)
            }
            Ok(Reply::Error(message)) => {
                self.state = ImageState::NoImage;
                dispatcher.notify(Category::Error, message.clone());
                Err(DispatchError::semantic("error", message).into())
            }
            Err(e) => {
                warn!(error = %e, "Image fetch failed");
                self.state = ImageState::NoImage;
                dispatcher.notify(Category::Error, format!("Could not fetch image: {e}"));
                Err(DispatchError::Transport(e).into())
            }
        }
    }

    /// Open the confirmation dialog. Requires a loaded image.
    pub fn open_save_confirmation(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            ImageState::ImageLoaded { image } => {
                self.state = ImageState::AwaitingSaveConfirmation { image };
                Ok(())
            }
            other => {
                self.state = other;
                Err(Error::guard("save needs a loaded image"))
            }
        }
    }

    /// Close the confirmation dialog without saving
    pub fn cancel_save(&mut self) {
        if let ImageState::AwaitingSaveConfirmation { image } = std::mem::take(&mut self.state) {
            self.state = ImageState::ImageLoaded { image };
        }
    }

    /// Commit the drawing: export, post, then re-fetch on success.
    ///
    /// The dialog is closed before the request is issued, so a second call
    /// is a guard violation whatever the outcome.
    #[instrument(skip_all)]
    pub async fn confirm_save(
        &mut self,
        dispatcher: &CommandDispatcher,
        canvas: &mut dyn SketchCanvas,
        path: &mut PathModel,
    ) -> Result<()> {
        let image = match std::mem::take(&mut self.state) {
            ImageState::AwaitingSaveConfirmation { image } => image,
            other => {
                self.state = other;
                return Err(Error::guard("save was not confirmed"));
            }
        };

        let svg = match canvas.export_svg() {
            Ok(svg) => svg,
            Err(e) => {
                warn!(error = %e, "SVG export failed");
                dispatcher.notify(Category::Error, format!("Could not export drawing: {e}"));
                self.state = ImageState::ImageLoaded { image };
                return Err(e.into());
            }
        };

        // the identity ties the upload to the pending image on the service side
        let request = SaveImageRequest {
            filename: image,
            svg,
        };
        info!(filename = %request.filename, "Saving drawing");

        match dispatcher.device().save_image(&request).await {
            Ok(Reply::Success(message)) => {
                dispatcher.notify(Category::Success, message);
                // a failed re-fetch is already reported and leaves no image
                let _ = self.fetch(dispatcher, canvas, path).await;
                Ok(())
            }
            Ok(Reply::Error(message)) => {
                dispatcher.notify(Category::Error, message.clone());
                Err(DispatchError::semantic("error", message).into())
            }
            Ok(Reply::Other { kind, message }) => {
                dispatcher.notify(Category::Error, message.clone());
                Err(DispatchError::semantic(kind, message).into())
            }
            Err(e) => {
                warn!(error = %e, "Save failed");
                dispatcher.notify(Category::Error, format!("Saving drawing failed: {e}"));
                Err(DispatchError::Transport(e).into())
            }
        }
    }
}
