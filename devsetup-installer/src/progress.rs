//! Progress emission
//!
//! Every batch reports through two channels:
//! - A per-batch stream handed to the caller that started the batch. It ends
//!   right after the batch's final `complete` event.
//! - A process-wide broadcast that transports (the WebSocket endpoint) subscribe
//!   to for every batch.
//!
//! Neither channel applies backpressure to the installer. A slow broadcast
//! subscriber lags and loses events; it never blocks a running script.

use chrono::Utc;
use devsetup_core::domain::progress::{ProgressEvent, ProgressStatus};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::trace;
use uuid::Uuid;

use crate::service::LineSink;

/// Default capacity of the broadcast channel
pub const DEFAULT_HUB_CAPACITY: usize = 1024;

/// Broadcast hub carrying progress events of all batches
#[derive(Clone)]
pub struct ProgressHub {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to the events of every batch started after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, event: ProgressEvent) {
        // no subscribers is not an error
        if self.sender.send(event).is_err() {
            trace!("No progress subscribers");
        }
    }
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

/// Event stream of a single batch
pub struct BatchProgress {
    batch_id: Uuid,
    receiver: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl BatchProgress {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    /// Waits for the next event
    ///
    /// Returns `None` once the batch has finished and all its events were read.
    pub async fn next(&mut self) -> Option<ProgressEvent> {
        self.receiver.recv().await
    }

    /// Drains the stream until the batch ends
    pub async fn collect(mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}

/// Emits the events of one batch and tracks its coarse percentage
pub(crate) struct BatchReporter {
    batch_id: Uuid,
    total: usize,
    finished: usize,
    hub: ProgressHub,
    stream: mpsc::UnboundedSender<ProgressEvent>,
}

impl BatchReporter {
    pub(crate) fn new(batch_id: Uuid, total: usize, hub: ProgressHub) -> (Self, BatchProgress) {
        let (stream, receiver) = mpsc::unbounded_channel();
        let reporter = Self {
            batch_id,
            total,
            finished: 0,
            hub,
            stream,
        };
        (reporter, BatchProgress { batch_id, receiver })
    }

    /// Finished jobs over total jobs; recomputed only at job boundaries
    pub(crate) fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.finished.min(self.total) * 100 / self.total) as u8
    }

    /// Records that one more job reached a terminal state
    pub(crate) fn job_finished(&mut self) {
        self.finished += 1;
    }

    pub(crate) fn running(&self, tool: &str, message: String) {
        self.emit(self.event(Some(tool), ProgressStatus::Running, message));
    }

    /// Builds the callback that turns captured script output into events
    ///
    /// The sink holds its own handles on both channels, so the per-batch
    /// stream stays open until the executor has dropped it.
    pub(crate) fn line_sink(&self, tool: &str) -> LineSink {
        let template = self.event(Some(tool), ProgressStatus::Running, String::new());
        let stream = self.stream.clone();
        let hub = self.hub.clone();

        Arc::new(move |line: &str| {
            let mut event = template.clone().with_log_line(line);
            event.message = line.to_string();
            event.timestamp = Utc::now();
            let _ = stream.send(event.clone());
            hub.publish(event);
        })
    }

    pub(crate) fn completed(&self, tool: &str, message: String) {
        self.emit(self.event(Some(tool), ProgressStatus::Completed, message));
    }

    pub(crate) fn failed(&self, tool: &str, message: String, error: String) {
        let event = self
            .event(Some(tool), ProgressStatus::Failed, message)
            .with_error(error);
        self.emit(event);
    }

    pub(crate) fn cancelled(&self, tool: &str, message: String) {
        self.emit(self.event(Some(tool), ProgressStatus::Cancelled, message));
    }

    /// Emits the final event; the per-batch stream closes when the reporter drops
    pub(crate) fn complete(self, message: &str) {
        let event = ProgressEvent::new(self.batch_id, None, ProgressStatus::Complete, 100, message);
        self.emit(event);
    }

    fn event(&self, tool: Option<&str>, status: ProgressStatus, message: String) -> ProgressEvent {
        ProgressEvent::new(
            self.batch_id,
            tool.map(str::to_string),
            status,
            self.percent(),
            message,
        )
    }

    fn emit(&self, event: ProgressEvent) {
        // the caller may have dropped its stream; the broadcast still gets it
        let _ = self.stream.send(event.clone());
        self.hub.publish(event);
    }
}
