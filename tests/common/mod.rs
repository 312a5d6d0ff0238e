//! Shared helpers for the render graph integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use fencegraph::backend::QueueRecorder;
use fencegraph::render_graph::DependencyGraph;
use fencegraph::{CompiledGraph, QueueType, RenderGraph, RenderNode, ResourceState};

/// Initialize logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Node `name` producing `name.out` (resource `name`) and reading `dep.out` for every dep.
pub fn node(name: &str, queue: QueueType, deps: &[&str]) -> RenderNode {
    deps.iter().fold(
        RenderNode::new(name, queue).with_output("out", name, ResourceState::Common),
        |node, dep| node.with_input(format!("{dep}.out"), ResourceState::Common),
    )
}

/// Attach a callback leaving a marker with the pass name in its queue stream.
pub fn marked(node: RenderNode, recorder: &QueueRecorder) -> RenderNode {
    let recorder = recorder.clone();
    node.with_callback(move |ctx| {
        recorder.mark(ctx.queue, ctx.name);
        Ok(())
    })
}

/// Depth prepass, async AO, shadow copy and lighting.
///
/// ```text
/// Depth(main) ──> AO(compute) ──> Lighting(main)
///      │  └──────────────────────────┘
///      └────> Shadow(copy)
/// ```
pub fn frame_nodes() -> Vec<RenderNode> {
    vec![
        RenderNode::new("depth", QueueType::Main)
            .with_output("depth", "Depth", ResourceState::DepthWrite),
        RenderNode::new("ao", QueueType::Compute)
            .with_input("depth.depth", ResourceState::ShaderResource)
            .with_output("occlusion", "Occlusion", ResourceState::UnorderedAccess),
        RenderNode::new("shadow", QueueType::Copy)
            .with_input("depth.depth", ResourceState::CopySource),
        RenderNode::new("lighting", QueueType::Main)
            .with_input("depth.depth", ResourceState::DepthRead)
            .with_input("ao.occlusion", ResourceState::ShaderResource),
    ]
}

pub fn frame_graph() -> RenderGraph {
    frame_nodes()
        .into_iter()
        .fold(RenderGraph::new(), RenderGraph::with_node)
}

/// Deterministic pseudo random generator for graph shapes
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407))
    }

    pub fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

/// Random DAG of `count` nodes declared in reverse dependency order.
pub fn random_nodes(seed: u64, count: usize) -> Vec<RenderNode> {
    let mut rng = Lcg::new(seed);
    let names: Vec<String> = (0..count).map(|i| format!("pass_{i}")).collect();

    let mut nodes: Vec<RenderNode> = (0..count)
        .map(|i| {
            let queue = QueueType::ALL[rng.below(3) as usize];
            let deps: Vec<&str> = (0..i)
                .filter(|_| rng.below(4) == 0)
                .map(|dep| names[dep].as_str())
                .collect();
            node(&names[i], queue, &deps)
        })
        .collect();
    nodes.reverse();
    nodes
}

pub fn random_graph(seed: u64, count: usize) -> RenderGraph {
    random_nodes(seed, count)
        .into_iter()
        .fold(RenderGraph::new(), RenderGraph::with_node)
}

fn merge(frontier: &mut [Option<usize>; 3], queue: QueueType, at: usize) {
    let slot = &mut frontier[queue.index()];
    if slot.map_or(true, |current| current < at) {
        *slot = Some(at);
    }
}

/// Check that every cross-queue dependency is ordered by the explicit waits.
///
/// A pass knows, per queue, the latest position in execution order known to
/// be complete when it starts. Knowledge comes from the previous pass on its
/// own queue and from the passes it waits on, and is closed transitively.
/// Returns the first producer/consumer pair left unordered.
pub fn find_unordered_edge(
    nodes: &[RenderNode],
    compiled: &CompiledGraph,
) -> Option<(String, String)> {
    let passes = compiled.passes();
    let position: HashMap<&str, usize> = passes
        .iter()
        .enumerate()
        .map(|(index, pass)| (pass.name(), index))
        .collect();

    let mut known: Vec<[Option<usize>; 3]> = Vec::with_capacity(passes.len());
    let mut last_on_queue: [Option<usize>; 3] = [None; 3];

    for (index, pass) in passes.iter().enumerate() {
        let mut frontier: [Option<usize>; 3] = [None; 3];
        if let Some(previous) = last_on_queue[pass.queue().index()] {
            merge(&mut frontier, pass.queue(), previous);
        }
        for name in compiled.sync_dependency_names(pass.name()) {
            let waited = position[name];
            merge(&mut frontier, passes[waited].queue(), waited);
        }

        loop {
            let before = frontier;
            for at in before.into_iter().flatten() {
                for queue in QueueType::ALL {
                    if let Some(inner) = known[at][queue.index()] {
                        merge(&mut frontier, queue, inner);
                    }
                }
            }
            if frontier == before {
                break;
            }
        }

        known.push(frontier);
        last_on_queue[pass.queue().index()] = Some(index);
    }

    let graph = DependencyGraph::build(nodes).ok()?;
    for consumer in 0..graph.len() {
        for &producer in graph.cross_queue_producers(consumer) {
            let producer_name = nodes[producer].name();
            let consumer_name = nodes[consumer].name();
            let produced_at = position[producer_name];
            let queue = passes[produced_at].queue();
            let covered = known[position[consumer_name]][queue.index()];
            if covered.map_or(true, |reached| reached < produced_at) {
                return Some((producer_name.to_string(), consumer_name.to_string()));
            }
        }
    }
    None
}
