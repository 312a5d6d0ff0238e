//! Redundant cross-queue synchronization removal.
//!
//! A queue executes its submissions in order and a fence value covers every
//! signal before it. Two consequences let the compiler drop explicit waits:
//!
//! 1. Waiting on the latest producer of a queue covers its earlier producers.
//! 2. If a node already (transitively) runs after an ancestor that waited on a
//!    producer, the node itself does not need to wait on that producer again.

use crate::backend::types::QueueType;
use crate::render_graph::graph::DependencyGraph;
use crate::SyncCullingConfig;

/// Submission position of a node on its queue: level first, then declaration index
fn queue_position(levels: &[u32], node: usize) -> (u32, usize) {
    (levels[node], node)
}

/// Compute the surviving cross-queue producers of every node.
pub(crate) fn cull_syncs(
    graph: &DependencyGraph,
    queues: &[QueueType],
    levels: &[u32],
    config: &SyncCullingConfig,
) -> Vec<Vec<usize>> {
    let candidates: Vec<Vec<usize>> = (0..graph.len())
        .map(|node| {
            let producers = graph.cross_queue_producers(node);
            if config.dedup_same_queue {
                latest_per_queue(producers, queues, levels)
            } else {
                producers.to_vec()
            }
        })
        .collect();

    if !config.transitive {
        return candidates;
    }

    (0..graph.len())
        .map(|node| cull_transitive(graph, queues, levels, &candidates, node))
        .collect()
}

/// Keep only the producer that runs last on each queue.
fn latest_per_queue(producers: &[usize], queues: &[QueueType], levels: &[u32]) -> Vec<usize> {
    let mut latest: [Option<usize>; 3] = [None; 3];
    for &producer in producers {
        let slot = &mut latest[queues[producer].index()];
        match *slot {
            Some(kept) if queue_position(levels, kept) >= queue_position(levels, producer) => {}
            _ => *slot = Some(producer),
        }
    }
    latest.into_iter().flatten().collect()
}

fn cull_transitive(
    graph: &DependencyGraph,
    queues: &[QueueType],
    levels: &[u32],
    candidates: &[Vec<usize>],
    node: usize,
) -> Vec<usize> {
    let mut remaining = candidates[node].clone();
    let Some(min_level) = remaining.iter().map(|&d| levels[d]).min() else {
        return remaining;
    };

    // `covers(a, d)`: ancestor `a` waited on `d`'s queue at or after `d`
    let covers = |ancestor: usize, dependency: usize| {
        candidates[ancestor].iter().any(|&waited| {
            queues[waited] == queues[dependency]
                && queue_position(levels, waited) >= queue_position(levels, dependency)
        })
    };

    let mut visited = vec![false; graph.len()];
    let mut stack: Vec<usize> = graph.predecessors(node).to_vec();

    while let Some(ancestor) = stack.pop() {
        // Ancestors below the lowest candidate cannot cover any candidate
        if visited[ancestor] || levels[ancestor] < min_level {
            continue;
        }
        visited[ancestor] = true;

        let before = remaining.len();
        remaining.retain(|&dependency| dependency == ancestor || !covers(ancestor, dependency));
        if remaining.len() != before {
            log::debug!(
                "Node {} reaches ancestor {} that already synchronized, {} sync(s) culled",
                node,
                ancestor,
                before - remaining.len()
            );
        }
        if remaining.is_empty() {
            break;
        }

        stack.extend(
            graph
                .predecessors(ancestor)
                .iter()
                .copied()
                .filter(|&p| !visited[p]),
        );
    }

    remaining
}
