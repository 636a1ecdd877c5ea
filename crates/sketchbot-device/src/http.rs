use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use sketchbot_canvas::Stroke;
use tracing::{debug, instrument};

use crate::api::DeviceApi;
use crate::error::{Error, Result};
use crate::types::{DeviceCommand, DeviceConfig, DevicePosition, Envelope, Reply, SaveImageRequest};

/// Device controller reached over HTTP
pub struct HttpDevice {
    client: Client,
    config: DeviceConfig,
}

impl HttpDevice {
    /// Create a new HTTP device client
    pub fn new(config: DeviceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::NotConfigured(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_connect() {
            Error::Network(format!(
                "Failed to connect to the arm controller at {}. Is it running?",
                self.config.base_url
            ))
        } else if e.is_timeout() {
            Error::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            Error::Network(e.to_string())
        }
    }

    async fn read(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok((status, body))
    }

    /// Send a request whose body is ignored on success
    async fn send_status_only(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let (status, body) = self.read(request).await?;
        if !status.is_success() {
            return Err(Error::Api(format!("HTTP {}: {}", status, body.trim())));
        }
        Ok(())
    }

    /// Send a request answering with a `{type, message}` envelope
    async fn send_for_reply<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Reply<T>> {
        let (status, body) = self.read(request).await?;
        parse_reply(status, &body)
    }
}

/// Interpret a response body.
///
/// An envelope wins regardless of status, since the service may report
/// semantic errors with a non-2xx code. Otherwise a 2xx plain-text body
/// becomes an informational reply and anything else is an API error.
fn parse_reply<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Reply<T>> {
    if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
        return envelope.into_reply();
    }
    if !status.is_success() {
        return Err(Error::Api(format!("HTTP {}: {}", status, body.trim())));
    }
    if serde_json::from_str::<serde_json::Value>(body).is_ok() {
        return Err(Error::InvalidResponse(format!(
            "expected {{type, message}} envelope, got {}",
            body.trim()
        )));
    }
    Ok(Reply::text(body.trim()))
}

/// Position bodies may also be a bare `{x, y, z, e}` object.
fn parse_position(status: StatusCode, body: &str) -> Result<Reply<DevicePosition>> {
    if status.is_success() {
        if let Ok(position) = serde_json::from_str::<DevicePosition>(body) {
            return Ok(Reply::Success(position));
        }
    }
    parse_reply(status, body)
}

#[async_trait]
impl DeviceApi for HttpDevice {
    #[instrument(skip(self))]
    async fn position(&self) -> Result<Reply<DevicePosition>> {
        let (status, body) = self.read(self.client.get(self.url("/position"))).await?;
        parse_position(status, &body)
    }

    #[instrument(skip(self))]
    async fn move_to(&self, target: DevicePosition) -> Result<()> {
        self.send_status_only(self.client.post(self.url("/move")).json(&target))
            .await
    }

    #[instrument(skip(self))]
    async fn command(&self, command: DeviceCommand) -> Result<Reply<String>> {
        let url = self.url(&format!("/command/{}", command.as_str()));
        self.send_for_reply(self.client.post(url)).await
    }

    #[instrument(skip(self, strokes), fields(strokes = strokes.len()))]
    async fn draw(&self, strokes: &[Stroke]) -> Result<()> {
        debug!("Sending {} stroke(s) to the arm", strokes.len());
        self.send_status_only(self.client.post(self.url("/draw")).json(strokes))
            .await
    }

    #[instrument(skip(self))]
    async fn current_image(&self) -> Result<Reply<String>> {
        self.send_for_reply(self.client.get(self.url("/get_image")))
            .await
    }

    #[instrument(skip(self, request), fields(filename = %request.filename, svg_len = request.svg.len()))]
    async fn save_image(&self, request: &SaveImageRequest) -> Result<Reply<String>> {
        self.send_for_reply(self.client.post(self.url("/save_image")).json(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let device =
            HttpDevice::new(DeviceConfig::new().with_base_url("http://arm.local:5000/")).unwrap();
        assert_eq!(device.url("/position"), "http://arm.local:5000/position");
        assert_eq!(device.base_url(), "http://arm.local:5000/");
    }

    #[test]
    fn test_parse_plain_text_body() {
        let reply: Reply<String> = parse_reply(StatusCode::OK, "No DexArm connected.\n").unwrap();
        assert_eq!(reply, Reply::text("No DexArm connected."));
    }

    #[test]
    fn test_parse_error_status_without_envelope() {
        let result: Result<Reply<String>> =
            parse_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        assert!(matches!(result, Err(Error::Api(msg)) if msg.contains("500")));
    }

    #[test]
    fn test_parse_error_status_with_envelope() {
        let reply: Reply<String> = parse_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"type":"error","message":"device offline"}"#,
        )
        .unwrap();
        assert_eq!(reply, Reply::Error("device offline".to_string()));
    }

    #[test]
    fn test_parse_unexpected_json() {
        let result: Result<Reply<String>> = parse_reply(StatusCode::OK, r#"[1, 2, 3]"#);
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_bare_position() {
        let reply = parse_position(StatusCode::OK, r#"{"x":4,"y":300,"z":0,"e":0}"#).unwrap();
        assert_eq!(reply, Reply::Success(DevicePosition::new(4, 300, 0, 0)));
    }
}
