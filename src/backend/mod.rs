//! Device abstraction layer
//!
//! Provides the fence traits a device implements, shared queue/resource types
//! and a dummy device for tests.

pub mod traits;
pub mod types;

#[cfg(feature = "dummy")]
pub mod dummy;

pub use traits::*;
pub use types::*;

#[cfg(feature = "dummy")]
pub use dummy::{DummyDevice, DummyFence, QueueCommand, QueueRecorder};
