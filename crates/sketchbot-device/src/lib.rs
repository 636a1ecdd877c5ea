//! Sketchbot Device - arm controller client
//!
//! This crate talks to the robotic-arm controller service:
//! - Api: the `DeviceApi` trait the synchronization engine depends on
//! - Http: `HttpDevice`, the reqwest-backed implementation
//! - Types: wire types (`DevicePosition`, `DeviceCommand`, `Reply`) and `DeviceConfig`
//! - Mock: `MockDevice`, a recording test double
//!
//! ## Wire contract
//!
//! | Method | Path                | Body                | Answer                 |
//! |--------|---------------------|---------------------|------------------------|
//! | GET    | `/position`         |                     | `{type, message}`      |
//! | POST   | `/move`             | `{x, y, z, e}`      | status only            |
//! | POST   | `/command/{name}`   |                     | `{type, message}`      |
//! | POST   | `/draw`             | `[Stroke, ...]`     | status only            |
//! | GET    | `/get_image`        |                     | `{type, message}`      |
//! | POST   | `/save_image`       | `{filename, svg}`   | `{type, message}`      |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use api::DeviceApi;
pub use error::{Error, Result};
pub use http::HttpDevice;
pub use mock::{DeviceCall, MockDevice};
pub use types::{
    Axis, DeviceCommand, DeviceConfig, DevicePosition, Reply, SaveImageRequest, DEFAULT_BASE_URL,
};
