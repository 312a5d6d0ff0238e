//! Dummy device for testing and development.
//!
//! This device doesn't talk to a GPU. Queue work completes the moment it is
//! recorded, and every wait/signal is appended to a per-queue instruction
//! stream so tests can inspect what the engine submitted.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::traits::{Device, DeviceError, DeviceResult, QueueFence};
use crate::backend::types::QueueType;
use crate::render_graph::sync::{FenceCounter, QueueCounters};

/// One entry of a recorded queue instruction stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCommand {
    /// The queue stalls until `fence` reaches `value`
    Wait { fence: QueueType, value: u64 },
    /// The queue signals `fence` with `value`
    Signal { fence: QueueType, value: u64 },
    /// Label pushed by a pass through [`QueueRecorder::mark`]
    Marker(String),
}

/// Per-queue recorded instruction streams, shared by all fences of a device.
#[derive(Debug, Default)]
pub struct QueueStreams([Mutex<Vec<QueueCommand>>; 3]);

impl QueueStreams {
    fn push(&self, queue: QueueType, command: QueueCommand) {
        self.0[queue.index()].lock().push(command);
    }

    fn snapshot(&self, queue: QueueType) -> Vec<QueueCommand> {
        self.0[queue.index()].lock().clone()
    }

    fn clear(&self) {
        for stream in &self.0 {
            stream.lock().clear();
        }
    }
}

/// Cloneable handle pass executors use to leave markers in a queue stream.
#[derive(Debug, Clone)]
pub struct QueueRecorder(Arc<QueueStreams>);

impl QueueRecorder {
    pub fn mark(&self, queue: QueueType, label: impl Into<String>) {
        self.0.push(queue, QueueCommand::Marker(label.into()));
    }
}

/// Fence of a [`DummyDevice`] queue.
#[derive(Debug)]
pub struct DummyFence {
    queue: QueueType,
    counter: FenceCounter,
    streams: Arc<QueueStreams>,
}

impl QueueFence for DummyFence {
    fn wait(&self, value: u64) -> DeviceResult<()> {
        let completed = self.counter.current();
        if value > completed {
            return Err(DeviceError::FenceNotReached {
                queue: self.queue,
                value,
                completed,
            });
        }
        Ok(())
    }

    fn signal_from_host(&self) -> u64 {
        let value = self.counter.next();
        log::trace!("DummyDevice: host signals {} fence = {}", self.queue, value);
        value
    }

    fn signal_from_queue(&self, queue: QueueType) -> u64 {
        let value = self.counter.next();
        log::trace!(
            "DummyDevice: {} queue signals {} fence = {}",
            queue,
            self.queue,
            value
        );
        self.streams.push(
            queue,
            QueueCommand::Signal {
                fence: self.queue,
                value,
            },
        );
        value
    }

    fn wait_from_queue(&self, queue: QueueType, value: u64) {
        log::trace!(
            "DummyDevice: {} queue waits for {} fence >= {}",
            queue,
            self.queue,
            value
        );
        self.streams.push(
            queue,
            QueueCommand::Wait {
                fence: self.queue,
                value,
            },
        );
    }

    fn completed_value(&self) -> u64 {
        self.counter.current()
    }
}

/// Dummy device.
#[derive(Debug)]
pub struct DummyDevice {
    fences: [DummyFence; 3],
    streams: Arc<QueueStreams>,
}

impl DummyDevice {
    /// Create a device with fresh counters.
    pub fn new() -> Self {
        Self::with_counters(QueueCounters::new())
    }

    /// Create a device backed by externally owned counters.
    pub fn with_counters(counters: QueueCounters) -> Self {
        let streams = Arc::new(QueueStreams::default());
        let fences = QueueType::ALL.map(|queue| DummyFence {
            queue,
            counter: counters.get(queue).clone(),
            streams: Arc::clone(&streams),
        });
        Self { fences, streams }
    }

    /// Recorded instruction stream of `queue`.
    pub fn commands(&self, queue: QueueType) -> Vec<QueueCommand> {
        self.streams.snapshot(queue)
    }

    /// Drop every recorded instruction. Fence values are kept.
    pub fn clear_commands(&self) {
        self.streams.clear();
    }

    pub fn recorder(&self) -> QueueRecorder {
        QueueRecorder(Arc::clone(&self.streams))
    }
}

impl Default for DummyDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for DummyDevice {
    type Fence = DummyFence;

    fn fence(&self, queue: QueueType) -> &DummyFence {
        &self.fences[queue.index()]
    }

    fn name(&self) -> &str {
        "Dummy Device"
    }
}
