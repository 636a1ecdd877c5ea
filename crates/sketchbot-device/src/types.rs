//! Wire types and client configuration for the device controller service

#![allow(missing_docs)]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default device controller URL
pub const DEFAULT_BASE_URL: &str = "http://oneplusarm.local:5000";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Position
// ============================================================================

/// Arm position as integer offsets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Extruder / rail axis
    pub e: i32,
}

impl DevicePosition {
    #[must_use]
    pub fn new(x: i32, y: i32, z: i32, e: i32) -> Self {
        Self { x, y, z, e }
    }

    /// Value of a single axis
    #[must_use]
    pub fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::E => self.e,
        }
    }

    /// Copy of this position with one axis replaced
    #[must_use]
    pub fn with_axis(mut self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
            Axis::E => self.e = value,
        }
        self
    }
}

impl fmt::Display for DevicePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {}, y: {}, z: {}, e: {}", self.x, self.y, self.z, self.e)
    }
}

/// A single position axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    E,
}

impl Axis {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::E => "e",
        }
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "e" => Ok(Self::E),
            other => Err(format!("unknown axis '{other}' (expected x, y, z or e)")),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Named control commands accepted on `POST /command/{name}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// Return to the home position
    Home,
    /// Reset the work origin
    Reset,
    /// Halt current motion
    Stop,
    /// Record the current Z as the paper touch height
    SetWorkHeight,
    /// Move to the recorded touch height to check it
    TestWorkHeight,
}

impl DeviceCommand {
    pub const ALL: [DeviceCommand; 5] = [
        DeviceCommand::Home,
        DeviceCommand::Reset,
        DeviceCommand::Stop,
        DeviceCommand::SetWorkHeight,
        DeviceCommand::TestWorkHeight,
    ];

    /// Path segment used by the device service
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Reset => "reset",
            Self::Stop => "stop",
            Self::SetWorkHeight => "setworkheight",
            Self::TestWorkHeight => "testworkheight",
        }
    }
}

impl FromStr for DeviceCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| format!("unknown command '{name}'"))
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Replies
// ============================================================================

/// Semantic outcome carried in a `{type, message}` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// `type == "success"`
    Success(T),
    /// `type == "error"`
    Error(String),
    /// Any other `type`, or a plain-text body
    Other { kind: String, message: String },
}

impl<T> Reply<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Reply for a plain-text body
    #[must_use]
    pub fn text(message: impl Into<String>) -> Self {
        Self::Other {
            kind: "text".to_string(),
            message: message.into(),
        }
    }
}

/// Raw `{type, message}` envelope
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: serde_json::Value,
}

impl Envelope {
    pub(crate) fn into_reply<T: DeserializeOwned>(self) -> Result<Reply<T>> {
        match self.kind.as_str() {
            "success" => serde_json::from_value(self.message)
                .map(Reply::Success)
                .map_err(|e| Error::InvalidResponse(format!("success payload: {e}"))),
            "error" => Ok(Reply::Error(message_text(self.message))),
            _ => Ok(Reply::Other {
                kind: self.kind,
                message: message_text(self.message),
            }),
        }
    }
}

fn message_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Body of `POST /save_image`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveImageRequest {
    /// Identity of the reference image the drawing was traced over
    pub filename: String,
    /// Exported drawing
    pub svg: String,
}

// ============================================================================
// Configuration
// ============================================================================

/// Device client configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Base URL (default: http://oneplusarm.local:5000)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DeviceConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(raw: &str) -> Envelope {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_success_position_envelope() {
        let reply: Reply<DevicePosition> =
            envelope(r#"{"type":"success","message":{"x":1,"y":2,"z":3,"e":0}}"#)
                .into_reply()
                .unwrap();
        assert_eq!(reply, Reply::Success(DevicePosition::new(1, 2, 3, 0)));
    }

    #[test]
    fn test_non_success_envelopes() {
        let reply: Reply<String> = envelope(r#"{"type":"error","message":"device offline"}"#)
            .into_reply()
            .unwrap();
        assert_eq!(reply, Reply::Error("device offline".to_string()));

        let reply: Reply<DevicePosition> =
            envelope(r#"{"type":"warning","message":"arm busy"}"#).into_reply().unwrap();
        assert_eq!(
            reply,
            Reply::Other {
                kind: "warning".to_string(),
                message: "arm busy".to_string()
            }
        );
    }

    #[test]
    fn test_success_with_wrong_payload_is_invalid() {
        let result: Result<Reply<DevicePosition>> =
            envelope(r#"{"type":"success","message":"not a position"}"#).into_reply();
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_with_axis_keeps_other_axes() {
        let pos = DevicePosition::new(0, 5, -3, 0).with_axis(Axis::X, 10);
        assert_eq!(pos, DevicePosition::new(10, 5, -3, 0));
        assert_eq!(pos.axis(Axis::Z), -3);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Z".parse::<Axis>().unwrap(), Axis::Z);
        assert!("w".parse::<Axis>().is_err());
        assert_eq!(
            "setworkheight".parse::<DeviceCommand>().unwrap(),
            DeviceCommand::SetWorkHeight
        );
        assert!("dance".parse::<DeviceCommand>().is_err());
    }

    #[test]
    fn test_position_display() {
        let text = DevicePosition::new(1, 2, 3, 0).to_string();
        assert_eq!(text, "x: 1, y: 2, z: 3, e: 0");
    }

    #[test]
    fn test_config_builder() {
        let config = DeviceConfig::new()
            .with_base_url("http://127.0.0.1:5000")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(DeviceConfig::default().base_url, DEFAULT_BASE_URL);
    }
}
