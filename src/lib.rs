//! Fencegraph - a multi-queue render graph compiler and executor
//!
//! Passes are declared once with a queue affinity (main, async compute, copy)
//! and the resources they produce and consume. Compilation turns the
//! declarations into a reusable per-frame schedule:
//!
//! - passes ordered into dependency levels
//! - cross-queue synchronization with redundant waits culled
//! - fence slots wired from producers to consumers
//! - a resource lifetime table for an external allocator
//!
//! # Example
//!
//! ```
//! use fencegraph::{QueueType, RenderGraph, RenderNode, ResourceState};
//!
//! let compiled = RenderGraph::new()
//!     .with_node(
//!         RenderNode::new("depth", QueueType::Main)
//!             .with_output("depth", "DepthBuffer", ResourceState::DepthWrite),
//!     )
//!     .with_node(
//!         RenderNode::new("ao", QueueType::Compute)
//!             .with_input("depth.depth", ResourceState::ShaderResource),
//!     )
//!     .compile()
//!     .unwrap();
//!
//! assert_eq!(compiled.level_count(), 2);
//! assert_eq!(compiled.sync_edge_count(), 1);
//! ```

pub mod backend;
pub mod render_graph;

pub use backend::{Device, DeviceError, QueueFence, QueueMask, QueueType, ResourceState, TextureFormat};
#[cfg(feature = "dummy")]
pub use backend::{DummyDevice, QueueCommand};
pub use render_graph::{
    CompileError, CompiledGraph, ExecuteError, ExecutedFrame, PassContext, PassDescriptor,
    PassError, PassExecutor, PassId, RenderGraph, RenderNode, ResourceLifetime,
    TransientResource,
};

/// Redundant synchronization removal, both passes enabled by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncCullingConfig {
    /// Keep only the latest producer per foreign queue
    pub dedup_same_queue: bool,
    /// Drop waits an ancestor already performed
    pub transitive: bool,
}

impl Default for SyncCullingConfig {
    fn default() -> Self {
        Self {
            dedup_same_queue: true,
            transitive: true,
        }
    }
}

impl SyncCullingConfig {
    /// Keep every cross-queue edge as an explicit wait
    pub fn disabled() -> Self {
        Self {
            dedup_same_queue: false,
            transitive: false,
        }
    }
}

/// Configuration for compiling a render graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// The device has an async compute queue. Without it compute passes run on main
    pub async_compute: bool,
    /// The device has a dedicated copy queue. Without it copy passes fall back to
    /// compute, or to main when there is no async compute either
    pub dedicated_copy: bool,
    /// Which redundant cross-queue waits are removed
    pub sync_culling: SyncCullingConfig,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            async_compute: true,
            dedicated_copy: true,
            sync_culling: SyncCullingConfig::default(),
        }
    }
}

impl CompileConfig {
    /// Set [`async_compute`](Self::async_compute)
    pub fn with_async_compute(mut self, enabled: bool) -> Self {
        self.async_compute = enabled;
        self
    }

    /// Set [`dedicated_copy`](Self::dedicated_copy)
    pub fn with_dedicated_copy(mut self, enabled: bool) -> Self {
        self.dedicated_copy = enabled;
        self
    }

    /// Replace the culling switches
    pub fn with_sync_culling(mut self, sync_culling: SyncCullingConfig) -> Self {
        self.sync_culling = sync_culling;
        self
    }
}
