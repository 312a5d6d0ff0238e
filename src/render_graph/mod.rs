//! Render Graph System
//!
//! Passes are declared as [`RenderNode`]s with a queue affinity, named outputs
//! and `"producer.output"` inputs. Compiling a [`RenderGraph`] orders the passes
//! into dependency levels, removes redundant cross-queue synchronization and
//! assigns the fence slots the [`CompiledGraph`] uses every frame.

mod compiler;
mod cull;
pub mod error;
pub mod executor;
pub mod graph;
pub mod pass;
pub mod resource;
pub mod schedule;
mod sort;
pub mod sync;

pub use error::*;
pub use executor::*;
pub use graph::*;
pub use pass::*;
pub use resource::*;
pub use schedule::*;
pub use sort::DependencyLevels;
pub use sync::*;
