//! Render node declarations
//!
//! A [`RenderNode`] names its queue, the outputs it produces and the outputs of
//! other nodes it consumes. Inputs refer to outputs as `"producer.output"`.

use std::fmt;

use crate::backend::types::{QueueType, ResourceState};
use crate::render_graph::resource::TransientResource;

/// Unique identifier for a pass, the index of its node in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(pub(crate) u32);

impl PassId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Error returned by a failing pass
pub type PassError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Context handed to a pass when it executes
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub id: PassId,
    pub name: &'a str,
    /// Queue the pass runs on, after fallback
    pub queue: QueueType,
    /// Dependency level in the compiled graph
    pub level: u32,
    /// Index of the frame being executed, starting at 0
    pub frame: u64,
}

/// Trait for the work a pass records when the graph executes
pub trait PassExecutor: Send + Sync {
    fn execute(&self, ctx: &PassContext<'_>) -> Result<(), PassError>;
}

impl<F> PassExecutor for F
where
    F: Fn(&PassContext<'_>) -> Result<(), PassError> + Send + Sync,
{
    fn execute(&self, ctx: &PassContext<'_>) -> Result<(), PassError> {
        self(ctx)
    }
}

/// Executor of nodes that never got one
struct NoopExecutor;

impl PassExecutor for NoopExecutor {
    fn execute(&self, _ctx: &PassContext<'_>) -> Result<(), PassError> {
        Ok(())
    }
}

/// Consumed output of another node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassInput {
    /// `"producer.output"`
    pub source: String,
    /// State the resource must be in while this node reads it
    pub state: ResourceState,
}

/// Named output backed by a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutput {
    /// Output name, addressed as `"node.name"` by consumers
    pub name: String,
    /// Resource backing the output
    pub resource: String,
    /// State the node leaves the resource in
    pub state: ResourceState,
}

/// A declared render pass, consumed by [`RenderGraph::compile`](crate::render_graph::RenderGraph::compile)
pub struct RenderNode {
    pub(crate) name: String,
    pub(crate) queue: QueueType,
    pub(crate) inputs: Vec<PassInput>,
    pub(crate) outputs: Vec<PassOutput>,
    pub(crate) transients: Vec<TransientResource>,
    pub(crate) executor: Box<dyn PassExecutor>,
}

impl RenderNode {
    /// Empty node on `queue`, executing nothing
    pub fn new(name: impl Into<String>, queue: QueueType) -> Self {
        Self {
            name: name.into(),
            queue,
            inputs: Vec::new(),
            outputs: Vec::new(),
            transients: Vec::new(),
            executor: Box::new(NoopExecutor),
        }
    }

    /// Consume `source` (`"producer.output"`) in `state`
    pub fn with_input(mut self, source: impl Into<String>, state: ResourceState) -> Self {
        self.inputs.push(PassInput {
            source: source.into(),
            state,
        });
        self
    }

    /// Produce output `name`, backed by `resource` in `state`
    pub fn with_output(
        mut self,
        name: impl Into<String>,
        resource: impl Into<String>,
        state: ResourceState,
    ) -> Self {
        self.outputs.push(PassOutput {
            name: name.into(),
            resource: resource.into(),
            state,
        });
        self
    }

    /// Declare a resource owned by the graph and created by this node
    pub fn with_transient(mut self, resource: TransientResource) -> Self {
        self.transients.push(resource);
        self
    }

    /// Work recorded when the pass executes
    pub fn with_executor(mut self, executor: impl PassExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    /// Closure flavour of [`with_executor`](Self::with_executor)
    pub fn with_callback<F>(self, callback: F) -> Self
    where
        F: Fn(&PassContext<'_>) -> Result<(), PassError> + Send + Sync + 'static,
    {
        self.with_executor(callback)
    }

    /// Unique name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested queue, before fallback
    pub fn queue(&self) -> QueueType {
        self.queue
    }

    /// Inputs in declaration order
    pub fn inputs(&self) -> &[PassInput] {
        &self.inputs
    }

    /// Outputs in declaration order
    pub fn outputs(&self) -> &[PassOutput] {
        &self.outputs
    }

    pub fn transients(&self) -> &[TransientResource] {
        &self.transients
    }

    /// Key other nodes use to consume `output`
    pub(crate) fn output_key(&self, output: &PassOutput) -> String {
        format!("{}.{}", self.name, output.name)
    }
}

impl fmt::Debug for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderNode")
            .field("name", &self.name)
            .field("queue", &self.queue)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("transients", &self.transients)
            .finish_non_exhaustive()
    }
}
