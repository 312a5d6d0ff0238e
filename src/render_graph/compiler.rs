//! Render graph compilation pipeline.
//!
//! ```text
//! RenderGraph -> queue fallback -> DependencyGraph -> topological order
//!             -> levels -> lifetimes -> sync culling -> CompiledGraph
//! ```

use crate::backend::types::QueueType;
use crate::render_graph::cull::cull_syncs;
use crate::render_graph::error::CompileResult;
use crate::render_graph::graph::{DependencyGraph, RenderGraph};
use crate::render_graph::pass::RenderNode;
use crate::render_graph::resource::compute_lifetimes;
use crate::render_graph::schedule::CompiledGraph;
use crate::render_graph::sort::{assign_levels, topological_sort};
use crate::CompileConfig;

/// Queue a pass declared for `queue` runs on with the available queues
pub(crate) fn resolve_queue(queue: QueueType, config: &CompileConfig) -> QueueType {
    match queue {
        QueueType::Main => QueueType::Main,
        QueueType::Compute if config.async_compute => QueueType::Compute,
        QueueType::Compute => QueueType::Main,
        QueueType::Copy if config.dedicated_copy => QueueType::Copy,
        QueueType::Copy if config.async_compute => QueueType::Compute,
        QueueType::Copy => QueueType::Main,
    }
}

fn apply_queue_fallback(nodes: &mut [RenderNode], config: &CompileConfig) {
    for node in nodes {
        let queue = resolve_queue(node.queue, config);
        if queue != node.queue {
            log::debug!(
                "Pass '{}' moved from the {} queue to the {} queue",
                node.name,
                node.queue,
                queue
            );
            node.queue = queue;
        }
    }
}

/// Compile a graph. No partial result survives an error.
pub(crate) fn compile(graph: RenderGraph, config: &CompileConfig) -> CompileResult<CompiledGraph> {
    let mut nodes = graph.into_nodes();
    apply_queue_fallback(&mut nodes, config);

    let dependencies = DependencyGraph::build(&nodes)?;
    let order = topological_sort(&dependencies, &nodes)?;
    let levels = assign_levels(&dependencies, &order);
    let lifetimes = compute_lifetimes(&nodes, &levels.levels)?;

    let queues: Vec<QueueType> = nodes.iter().map(|node| node.queue).collect();
    let syncs = cull_syncs(&dependencies, &queues, &levels.levels, &config.sync_culling);
    let culled = dependencies.cross_queue_edge_count() - syncs.iter().map(Vec::len).sum::<usize>();

    let compiled = CompiledGraph::assemble(nodes, &levels, &syncs, lifetimes);

    log::info!(
        "Compiled render graph: {} passes, {} levels, {} cross-queue syncs ({} culled), {} resources",
        compiled.pass_count(),
        compiled.level_count(),
        compiled.sync_edge_count(),
        culled,
        compiled.resource_lifetimes().len()
    );
    log::debug!("Render graph schedule:\n{}", compiled.describe());

    Ok(compiled)
}
