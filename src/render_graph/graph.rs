//! Render graph definition and dependency graph construction

use std::collections::HashMap;

use crate::render_graph::compiler;
use crate::render_graph::error::{CompileError, CompileResult};
use crate::render_graph::pass::{PassId, RenderNode};
use crate::render_graph::schedule::CompiledGraph;
use crate::CompileConfig;

/// The main render graph structure, a list of declared nodes
#[derive(Debug, Default)]
pub struct RenderGraph {
    nodes: Vec<RenderNode>,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: RenderNode) -> PassId {
        let id = PassId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Builder flavour of [`add_node`](Self::add_node)
    pub fn with_node(mut self, node: RenderNode) -> Self {
        self.add_node(node);
        self
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn into_nodes(self) -> Vec<RenderNode> {
        self.nodes
    }

    /// Compile with the default configuration
    pub fn compile(self) -> CompileResult<CompiledGraph> {
        self.compile_with(&CompileConfig::default())
    }

    pub fn compile_with(self, config: &CompileConfig) -> CompileResult<CompiledGraph> {
        compiler::compile(self, config)
    }
}

/// Producer/consumer edges between the nodes of a graph.
///
/// Node indices are declaration indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    /// Predecessors on a different queue, the synchronization candidates
    cross_queue: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Match every input against the declared outputs.
    pub fn build(nodes: &[RenderNode]) -> CompileResult<Self> {
        let mut names: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if names.insert(&node.name, index).is_some() {
                return Err(CompileError::DuplicateNodeName(node.name.clone()));
            }
        }

        let mut producers: HashMap<String, usize> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            for output in &node.outputs {
                let key = node.output_key(output);
                if producers.contains_key(&key) {
                    log::warn!("Output '{}' is declared twice, keeping the first", key);
                    continue;
                }
                producers.insert(key, index);
            }
        }

        let mut graph = Self {
            successors: vec![Vec::new(); nodes.len()],
            predecessors: vec![Vec::new(); nodes.len()],
            cross_queue: vec![Vec::new(); nodes.len()],
        };

        for (consumer, node) in nodes.iter().enumerate() {
            for input in &node.inputs {
                let Some(&producer) = producers.get(&input.source) else {
                    return Err(CompileError::UnresolvedInput {
                        node: node.name.clone(),
                        input: input.source.clone(),
                    });
                };
                if producer == consumer {
                    return Err(CompileError::SelfReferencingOutput {
                        node: node.name.clone(),
                        input: input.source.clone(),
                    });
                }
                if graph.predecessors[consumer].contains(&producer) {
                    continue;
                }

                graph.successors[producer].push(consumer);
                graph.predecessors[consumer].push(producer);
                if nodes[producer].queue != node.queue {
                    graph.cross_queue[consumer].push(producer);
                }
            }
        }

        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.predecessors[node]
    }

    /// Producers of `node` running on another queue
    pub fn cross_queue_producers(&self, node: usize) -> &[usize] {
        &self.cross_queue[node]
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    pub fn cross_queue_edge_count(&self) -> usize {
        self.cross_queue.iter().map(Vec::len).sum()
    }
}
