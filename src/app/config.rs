//! Application configuration types

use serde::{Deserialize, Serialize};
use sketchbot_canvas::CanvasSettings;
use sketchbot_core::SessionConfig;
use sketchbot_device::{DeviceConfig, DEFAULT_BASE_URL};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub canvas: CanvasSettings,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Where the arm controller lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DeviceSettings {
    /// Client configuration for these settings
    pub fn client_config(&self) -> DeviceConfig {
        DeviceConfig::new()
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_settings_to_client_config() {
        let settings = DeviceSettings {
            base_url: "http://arm.lan:5000".to_string(),
            timeout_secs: 5,
        };
        let config = settings.client_config();
        assert_eq!(config.base_url, "http://arm.lan:5000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
