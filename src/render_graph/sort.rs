//! Topological ordering and dependency levels.

use crate::render_graph::error::{CompileError, CompileResult};
use crate::render_graph::graph::DependencyGraph;
use crate::render_graph::pass::RenderNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Depth-first topological sort.
///
/// Roots are visited in declaration order and the result is the reverse
/// post-order, so every producer precedes its consumers. Reaching a node that
/// is still on the stack means the graph has a cycle through it.
///
/// The walk keeps its own stack of `(node, next successor)` frames, so the
/// depth of the graph is not bounded by the thread stack.
pub(crate) fn topological_sort(
    graph: &DependencyGraph,
    nodes: &[RenderNode],
) -> CompileResult<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; graph.len()];
    let mut post_order = Vec::with_capacity(graph.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..graph.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::OnStack;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let Some(&successor) = graph.successors(node).get(next) else {
                marks[node] = Mark::Done;
                post_order.push(node);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks[successor] {
                Mark::Done => {}
                Mark::OnStack => {
                    return Err(CompileError::CircularDependency {
                        node: nodes[successor].name.clone(),
                    })
                }
                Mark::Unvisited => {
                    marks[successor] = Mark::OnStack;
                    stack.push((successor, 0));
                }
            }
        }
    }

    post_order.reverse();
    Ok(post_order)
}

/// Longest-path depth of every node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLevels {
    /// Level of each node, indexed by declaration index
    pub levels: Vec<u32>,
    /// Number of distinct levels (highest level + 1, 0 for an empty graph)
    pub level_count: u32,
}

/// Assign every node the earliest wave it could run in.
pub(crate) fn assign_levels(graph: &DependencyGraph, order: &[usize]) -> DependencyLevels {
    let mut levels = vec![0u32; graph.len()];
    let mut max_level = 0;

    for &node in order {
        for &successor in graph.successors(node) {
            let level = levels[node] + 1;
            if levels[successor] < level {
                levels[successor] = level;
                max_level = max_level.max(level);
            }
        }
    }

    let level_count = if levels.is_empty() { 0 } else { max_level + 1 };
    DependencyLevels {
        levels,
        level_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{QueueType, ResourceState};

    /// Node `name` producing `name.out` and reading `dep.out` for every dep
    fn node(name: &str, deps: &[&str]) -> RenderNode {
        deps.iter().fold(
            RenderNode::new(name, QueueType::Main).with_output(
                "out",
                format!("{name}_target"),
                ResourceState::RenderTarget,
            ),
            |node, dep| node.with_input(format!("{dep}.out"), ResourceState::ShaderResource),
        )
    }

    fn position(order: &[usize], node: usize) -> usize {
        order.iter().position(|&n| n == node).unwrap()
    }

    #[test]
    fn test_sort_respects_edges() {
        //     a
        //    / \
        //   b   c
        //    \ /
        //     d
        let nodes = vec![
            node("d", &["b", "c"]),
            node("c", &["a"]),
            node("b", &["a"]),
            node("a", &[]),
        ];
        let graph = DependencyGraph::build(&nodes).unwrap();
        let order = topological_sort(&graph, &nodes).unwrap();

        assert_eq!(order.len(), 4);
        for consumer in 0..graph.len() {
            for &producer in graph.predecessors(consumer) {
                assert!(position(&order, producer) < position(&order, consumer));
            }
        }
    }

    #[test]
    fn test_sort_independent_nodes() {
        let nodes = vec![node("a", &[]), node("b", &[]), node("c", &[])];
        let graph = DependencyGraph::build(&nodes).unwrap();
        let mut order = topological_sort(&graph, &nodes).unwrap();
        order.sort();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_three_nodes() {
        let nodes = vec![node("a", &["c"]), node("b", &["a"]), node("c", &["b"])];
        let graph = DependencyGraph::build(&nodes).unwrap();
        match topological_sort(&graph, &nodes) {
            Err(CompileError::CircularDependency { node }) => {
                assert!(["a", "b", "c"].contains(&node.as_str()), "{node}");
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_cycle() {
        let nodes = vec![
            node("free", &[]),
            node("a", &["b"]),
            node("b", &["a"]),
        ];
        let graph = DependencyGraph::build(&nodes).unwrap();
        assert!(matches!(
            topological_sort(&graph, &nodes),
            Err(CompileError::CircularDependency { .. })
        ));
    }

    #[test]
    fn test_levels_longest_path() {
        // a -> b -> c, a -> c: c sits two waves after a
        let nodes = vec![node("a", &[]), node("b", &["a"]), node("c", &["a", "b"])];
        let graph = DependencyGraph::build(&nodes).unwrap();
        let order = topological_sort(&graph, &nodes).unwrap();
        let levels = assign_levels(&graph, &order);

        assert_eq!(levels.levels, vec![0, 1, 2]);
        assert_eq!(levels.level_count, 3);
    }

    #[test]
    fn test_levels_strictly_increase_along_edges() {
        let nodes = vec![
            node("shadow", &[]),
            node("depth", &[]),
            node("ao", &["depth"]),
            node("lighting", &["shadow", "ao", "depth"]),
            node("post", &["lighting"]),
        ];
        let graph = DependencyGraph::build(&nodes).unwrap();
        let order = topological_sort(&graph, &nodes).unwrap();
        let levels = assign_levels(&graph, &order);

        for consumer in 0..graph.len() {
            for &producer in graph.predecessors(consumer) {
                assert!(levels.levels[consumer] > levels.levels[producer]);
            }
        }
        assert_eq!(levels.levels[3], 2);
        assert_eq!(levels.level_count, 4);
    }

    #[test]
    fn test_deep_chain_does_not_exhaust_the_stack() {
        const DEPTH: usize = 50_000;
        let names: Vec<String> = (0..DEPTH).map(|i| format!("p{i}")).collect();
        let nodes: Vec<RenderNode> = (0..DEPTH)
            .map(|i| match i.checked_sub(1) {
                Some(previous) => node(&names[i], &[names[previous].as_str()]),
                None => node(&names[i], &[]),
            })
            .collect();
        let graph = DependencyGraph::build(&nodes).unwrap();
        let order = topological_sort(&graph, &nodes).unwrap();

        assert_eq!(order, (0..DEPTH).collect::<Vec<_>>());
        let levels = assign_levels(&graph, &order);
        assert_eq!(levels.level_count as usize, DEPTH);
        assert_eq!(levels.levels[DEPTH - 1] as usize, DEPTH - 1);
    }

    #[test]
    fn test_cycle_at_the_end_of_a_deep_chain() {
        // p0 <- p1 <- ... <- p9999, and p0 also reads p9999
        const DEPTH: usize = 10_000;
        let names: Vec<String> = (0..DEPTH).map(|i| format!("p{i}")).collect();
        let nodes: Vec<RenderNode> = (0..DEPTH)
            .map(|i| {
                let previous = (i + DEPTH - 1) % DEPTH;
                node(&names[i], &[names[previous].as_str()])
            })
            .collect();
        let graph = DependencyGraph::build(&nodes).unwrap();
        assert_eq!(
            topological_sort(&graph, &nodes),
            Err(CompileError::CircularDependency { node: "p0".into() })
        );
    }

    #[test]
    fn test_levels_empty_graph() {
        let graph = DependencyGraph::default();
        let levels = assign_levels(&graph, &[]);
        assert_eq!(levels.level_count, 0);
        assert!(levels.levels.is_empty());
    }
}
