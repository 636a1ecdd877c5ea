//! Transmission routing and outbound delivery
//!
//! [`TransmissionController`] decides *whether* a stroke goes out now.
//! [`Outbound`] decides *how* queued sends are scheduled against the device.

use serde::{Deserialize, Serialize};
use sketchbot_canvas::Stroke;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::dispatcher::CommandDispatcher;
use crate::path_model::PathModel;

/// When completed strokes are transmitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionMode {
    /// Every completed ink stroke is sent on its own, immediately
    #[default]
    Aggressive,
    /// Strokes accumulate until the operator asks to send the drawing
    Batched,
}

impl TransmissionMode {
    /// The other mode
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Aggressive => Self::Batched,
            Self::Batched => Self::Aggressive,
        }
    }

    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Batched => "batched",
        }
    }
}

impl std::fmt::Display for TransmissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes strokes to the outbound queue according to the current mode
#[derive(Debug, Clone, Default)]
pub struct TransmissionController {
    mode: TransmissionMode,
}

impl TransmissionController {
    /// Create a controller in `mode`
    #[must_use]
    pub fn new(mode: TransmissionMode) -> Self {
        Self { mode }
    }

    /// Current mode
    #[must_use]
    pub fn mode(&self) -> TransmissionMode {
        self.mode
    }

    /// Switch mode. Nothing already captured is sent or discarded.
    pub fn set_mode(&mut self, mode: TransmissionMode) {
        debug!(from = %self.mode, to = %mode, "Transmission mode");
        self.mode = mode;
    }

    /// Flip between aggressive and batched, returning the new mode
    pub fn toggle(&mut self) -> TransmissionMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Path to send for a freshly completed stroke, if any.
    ///
    /// Only aggressive mode sends, and only ink.
    #[must_use]
    pub fn on_stroke(&self, stroke: &Stroke) -> Option<Vec<Stroke>> {
        match self.mode {
            TransmissionMode::Aggressive if stroke.is_ink() => Some(vec![stroke.clone()]),
            _ => None,
        }
    }

    /// Path to send for an explicit "send drawing", `None` when there is
    /// nothing to send.
    ///
    /// Works in either mode; in aggressive mode it re-sends everything.
    #[must_use]
    pub fn send_drawing(&self, path: &PathModel) -> Option<Vec<Stroke>> {
        if path.is_empty() {
            return None;
        }
        Some(path.transmittable())
    }
}

/// How outbound path sends are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Each send is an independent background task; arrival order is not
    /// guaranteed
    #[default]
    Concurrent,
    /// One send at a time, in submission order
    Ordered,
}

enum Job {
    Send(Vec<Stroke>),
    Flush(oneshot::Sender<()>),
}

enum Lane {
    Concurrent(JoinSet<()>),
    Ordered(mpsc::UnboundedSender<Job>),
}

/// Fire-and-forget path delivery.
///
/// Must be created inside a tokio runtime. Outcomes are reported by the
/// dispatcher; callers never see them. Dropping an `Outbound` abandons
/// sends that have not completed.
pub struct Outbound {
    dispatcher: CommandDispatcher,
    lane: Lane,
    // sends whose device call has not returned yet
    pending: Arc<AtomicUsize>,
}

impl Outbound {
    /// Create a delivery queue
    #[must_use]
    pub fn new(delivery: Delivery, dispatcher: CommandDispatcher) -> Self {
        let pending = Arc::new(AtomicUsize::new(0));
        let lane = match delivery {
            Delivery::Concurrent => Lane::Concurrent(JoinSet::new()),
            Delivery::Ordered => {
                let (jobs, rx) = mpsc::unbounded_channel();
                tokio::spawn(run_ordered(dispatcher.clone(), rx, Arc::clone(&pending)));
                Lane::Ordered(jobs)
            }
        };
        Self {
            dispatcher,
            lane,
            pending,
        }
    }

    /// Delivery policy in use
    #[must_use]
    pub fn delivery(&self) -> Delivery {
        match self.lane {
            Lane::Concurrent(_) => Delivery::Concurrent,
            Lane::Ordered(_) => Delivery::Ordered,
        }
    }

    /// Queue a path for sending and return immediately
    pub fn submit(&mut self, path: Vec<Stroke>) {
        debug!(strokes = path.len(), "Queueing path");
        self.pending.fetch_add(1, Ordering::SeqCst);
        match &mut self.lane {
            Lane::Concurrent(tasks) => {
                while let Some(done) = tasks.try_join_next() {
                    log_join(done);
                }
                let dispatcher = self.dispatcher.clone();
                let pending = Arc::clone(&self.pending);
                tasks.spawn(async move {
                    // failures are already reported by the dispatcher
                    let _ = dispatcher.send_path(path).await;
                    pending.fetch_sub(1, Ordering::SeqCst);
                });
            }
            Lane::Ordered(jobs) => {
                if jobs.send(Job::Send(path)).is_err() {
                    self.pending.fetch_sub(1, Ordering::SeqCst);
                    warn!("Ordered delivery worker is gone; path dropped");
                }
            }
        }
    }

    /// Wait until every path submitted so far has been attempted
    pub async fn flush(&mut self) {
        match &mut self.lane {
            Lane::Concurrent(tasks) => {
                while let Some(done) = tasks.join_next().await {
                    log_join(done);
                }
            }
            Lane::Ordered(jobs) => {
                let (tx, rx) = oneshot::channel();
                if jobs.send(Job::Flush(tx)).is_ok() {
                    let _ = rx.await;
                }
            }
        }
    }

    /// Sends submitted but not yet finished
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!(error = %e, "Path send task did not complete");
    }
}

async fn run_ordered(
    dispatcher: CommandDispatcher,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Send(path) => {
                let _ = dispatcher.send_path(path).await;
                pending.fetch_sub(1, Ordering::SeqCst);
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    info!("Ordered delivery worker stopped");
}
