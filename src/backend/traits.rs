//! Device abstraction traits
//!
//! The compiled graph never talks to a GPU API directly. It only needs one
//! timeline fence per queue, which the device implementation supplies.

use crate::backend::types::QueueType;
use thiserror::Error;

/// Device error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("fence of the {queue} queue never reaches {value} (completed: {completed})")]
    FenceNotReached {
        queue: QueueType,
        value: u64,
        completed: u64,
    },
    #[error("Device lost")]
    DeviceLost,
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Monotonic timeline fence owned by one queue.
///
/// Values only ever grow. Reaching a value means every piece of work submitted
/// before the matching signal has completed.
pub trait QueueFence: Send + Sync {
    /// Block the calling thread until the fence reaches `value`.
    fn wait(&self, value: u64) -> DeviceResult<()>;

    /// Signal the next value from the host and return it.
    fn signal_from_host(&self) -> u64;

    /// Record a signal of the next value into `queue`'s instruction stream and return it.
    fn signal_from_queue(&self, queue: QueueType) -> u64;

    /// Record a wait into `queue`'s instruction stream: the device stalls `queue`
    /// until this fence reaches `value`. Never blocks the calling thread.
    fn wait_from_queue(&self, queue: QueueType, value: u64);

    /// Last value known to be reached.
    fn completed_value(&self) -> u64;
}

/// Device owning the three queue fences
pub trait Device {
    type Fence: QueueFence;

    /// Fence signaled by work on `queue`
    fn fence(&self, queue: QueueType) -> &Self::Fence;

    /// Human readable device name for logs
    fn name(&self) -> &str;
}
