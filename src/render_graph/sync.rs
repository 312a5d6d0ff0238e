//! Lock-free fence bookkeeping.
//!
//! - [`FenceSlot`] - per-pass value a dependent queue must wait for
//! - [`FenceCounter`] - monotonic per-queue counter handed out by a device
//! - [`QueueCounters`] - the three counters of one device

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::backend::types::QueueType;

/// Fence value published by producers and read by the consuming pass.
///
/// Several producers on the same queue may race on one slot. Only the maximum
/// matters: waiting for a larger value of the same fence implies every smaller
/// one was reached.
#[derive(Debug, Default)]
pub struct FenceSlot(AtomicU64);

impl FenceSlot {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Current published value.
    pub fn value(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the slot to `value` unless it already holds something larger.
    ///
    /// Returns the value stored after the call.
    pub fn raise(&self, value: u64) -> u64 {
        let mut current = self.0.load(Ordering::Acquire);
        while current < value {
            match self
                .0
                .compare_exchange_weak(current, value, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return value,
                Err(actual) => current = actual,
            }
        }
        current
    }
}

/// Shared monotonic counter backing a queue fence.
///
/// Clones share the same value, so a device and a test can hold the same handle.
#[derive(Debug, Clone, Default)]
pub struct FenceCounter(Arc<AtomicU64>);

impl FenceCounter {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(value: u64) -> Self {
        Self(Arc::new(AtomicU64::new(value)))
    }

    /// Increment and return the new value.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

/// Fence counters of one device, one per queue
#[derive(Debug, Clone, Default)]
pub struct QueueCounters([FenceCounter; 3]);

impl QueueCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, queue: QueueType) -> &FenceCounter {
        &self.0[queue.index()]
    }
}
