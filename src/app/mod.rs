//! Application wiring: configuration and device construction

pub mod config;
pub mod loader;

pub use config::AppConfig;
pub use loader::load_config;

use anyhow::{Context, Result};
use sketchbot_core::{CommandDispatcher, Notifier};
use sketchbot_device::HttpDevice;
use std::sync::Arc;
use tracing::info;

/// Build a dispatcher over the configured HTTP device
pub fn dispatcher(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<CommandDispatcher> {
    let device = HttpDevice::new(config.device.client_config())
        .context("Failed to create device client")?;
    info!(base_url = %device.base_url(), "Device client ready");
    Ok(CommandDispatcher::new(Arc::new(device), notifier))
}
