//! Progress reporting
//!
//! The coordinator calls a [`ProgressSink`] once per finished task. Sinks run
//! on the coordinator's join loop, so they must return quickly.

use crate::model::ProgressSnapshot;
use tokio::sync::mpsc;

/// Receives progress snapshots during a run
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressSnapshot) + Send + Sync,
{
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

/// Emits each snapshot as a tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        tracing::info!(
            "Progress: {}/{} ({})",
            snapshot.processed,
            snapshot.total,
            snapshot.current_url.as_deref().unwrap_or("-")
        );
    }
}

/// Queues snapshots onto an unbounded channel
///
/// Sending never blocks. Snapshots sent after the receiver is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ProgressSnapshot>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressSnapshot>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if self.sender.send(snapshot.clone()).is_err() {
            tracing::trace!("Progress receiver dropped; snapshot discarded");
        }
    }
}
