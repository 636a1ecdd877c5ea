//! Configuration loading
//!
//! Embedded defaults, then optional files, then environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let env_name = std::env::var("SKETCHBOT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(File::with_name("config/local").required(false))
        .add_source(environment())
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

// SKETCHBOT_DEVICE__BASE_URL, not SKETCHBOT__DEVICE__BASE_URL
fn environment() -> Environment {
    Environment::with_prefix("SKETCHBOT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
