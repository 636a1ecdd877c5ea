//! Mock device for testing
//!
//! Records every call and answers from per-endpoint queues, falling back to
//! a healthy default when a queue is empty.

use async_trait::async_trait;
use sketchbot_canvas::Stroke;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::api::DeviceApi;
use crate::error::{Error, Result};
use crate::types::{DeviceCommand, DevicePosition, Reply, SaveImageRequest};

/// A call observed by [`MockDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `GET /position`
    Position,
    /// `POST /move`
    Move(DevicePosition),
    /// `POST /command/{name}`
    Command(DeviceCommand),
    /// `POST /draw`
    Draw(Vec<Stroke>),
    /// `GET /get_image`
    CurrentImage,
    /// `POST /save_image`
    SaveImage(SaveImageRequest),
}

type MoveHook = Arc<dyn Fn(DevicePosition) + Send + Sync>;

#[derive(Default)]
struct State {
    calls: Vec<DeviceCall>,
    positions: VecDeque<Result<Reply<DevicePosition>>>,
    moves: VecDeque<Result<()>>,
    commands: VecDeque<Result<Reply<String>>>,
    draws: VecDeque<Result<()>>,
    images: VecDeque<Result<Reply<String>>>,
    saves: VecDeque<Result<Reply<String>>>,
}

/// A mock device that returns queued replies or healthy defaults.
#[derive(Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<State>>,
    move_hook: Option<MoveHook>,
}

impl MockDevice {
    /// Create a new mock device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` with the target of every move before it is answered
    #[must_use]
    pub fn with_move_hook(mut self, hook: impl Fn(DevicePosition) + Send + Sync + 'static) -> Self {
        self.move_hook = Some(Arc::new(hook));
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue the next `/position` answer
    pub fn push_position(&self, reply: Result<Reply<DevicePosition>>) {
        self.lock().positions.push_back(reply);
    }

    /// Queue the next `/move` answer
    pub fn push_move(&self, reply: Result<()>) {
        self.lock().moves.push_back(reply);
    }

    /// Queue the next `/command` answer
    pub fn push_command(&self, reply: Result<Reply<String>>) {
        self.lock().commands.push_back(reply);
    }

    /// Queue the next `/draw` answer
    pub fn push_draw(&self, reply: Result<()>) {
        self.lock().draws.push_back(reply);
    }

    /// Queue the next `/get_image` answer
    pub fn push_image(&self, reply: Result<Reply<String>>) {
        self.lock().images.push_back(reply);
    }

    /// Queue the next `/save_image` answer
    pub fn push_save(&self, reply: Result<Reply<String>>) {
        self.lock().saves.push_back(reply);
    }

    /// All calls so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    /// Payloads of every `/draw` call, in order
    #[must_use]
    pub fn draw_payloads(&self) -> Vec<Vec<Stroke>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Draw(strokes) => Some(strokes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of calls matching `pred`
    pub fn count(&self, pred: impl Fn(&DeviceCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: DeviceCall) {
        self.lock().calls.push(call);
    }
}

#[async_trait]
impl DeviceApi for MockDevice {
    async fn position(&self) -> Result<Reply<DevicePosition>> {
        self.record(DeviceCall::Position);
        self.lock()
            .positions
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::Success(DevicePosition::default())))
    }

    async fn move_to(&self, target: DevicePosition) -> Result<()> {
        self.record(DeviceCall::Move(target));
        if let Some(hook) = &self.move_hook {
            hook(target);
        }
        self.lock().moves.pop_front().unwrap_or(Ok(()))
    }

    async fn command(&self, command: DeviceCommand) -> Result<Reply<String>> {
        self.record(DeviceCall::Command(command));
        self.lock()
            .commands
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::Success(format!("{command} done"))))
    }

    async fn draw(&self, strokes: &[Stroke]) -> Result<()> {
        self.record(DeviceCall::Draw(strokes.to_vec()));
        self.lock().draws.pop_front().unwrap_or(Ok(()))
    }

    async fn current_image(&self) -> Result<Reply<String>> {
        self.record(DeviceCall::CurrentImage);
        self.lock().images.pop_front().unwrap_or_else(|| {
            Ok(Reply::Other {
                kind: "info".to_string(),
                message: "no image pending".to_string(),
            })
        })
    }

    async fn save_image(&self, request: &SaveImageRequest) -> Result<Reply<String>> {
        self.record(DeviceCall::SaveImage(request.clone()));
        self.lock()
            .saves
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::Success("saved".to_string())))
    }
}

/// Shorthand for a transport failure in queued replies
#[must_use]
pub fn network_down() -> Error {
    Error::Network("connection refused".to_string())
}
