//! Transient resources and resource lifetimes
//!
//! The lifetime table is the one output of compilation meant for an external
//! allocator: for every resource it lists the dependency levels touching it
//! and the `(state, queue)` pairs needed at each of them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::backend::types::{QueueType, ResourceState, TextureFormat};
use crate::render_graph::error::{CompileError, CompileResult};
use crate::render_graph::pass::{PassOutput, RenderNode};

/// Size and kind of a transient resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceDesc {
    Texture {
        width: u32,
        height: u32,
        format: TextureFormat,
    },
    Buffer {
        size: u64,
    },
}

impl ResourceDesc {
    /// Unpadded size, a lower bound for the allocator
    pub fn size_in_bytes(&self) -> u64 {
        match self {
            ResourceDesc::Texture {
                width,
                height,
                format,
            } => *width as u64 * *height as u64 * format.bytes_per_pixel() as u64,
            ResourceDesc::Buffer { size } => *size,
        }
    }
}

/// Resource owned by the graph, created by the node declaring it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientResource {
    pub name: String,
    pub desc: ResourceDesc,
}

impl TransientResource {
    pub fn texture(name: impl Into<String>, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            name: name.into(),
            desc: ResourceDesc::Texture {
                width,
                height,
                format,
            },
        }
    }

    pub fn buffer(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            desc: ResourceDesc::Buffer { size },
        }
    }
}

/// State a resource is needed in, on a given queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceUsage {
    pub state: ResourceState,
    pub queue: QueueType,
}

impl ResourceUsage {
    /// Check if the usage may modify the resource
    pub fn is_write(&self) -> bool {
        self.state.is_write()
    }

    pub fn is_read(&self) -> bool {
        self.state.is_read()
    }
}

/// Lifetime record of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLifetime {
    name: String,
    first_level: u32,
    usages: BTreeMap<u32, BTreeSet<ResourceUsage>>,
    transient: Option<ResourceDesc>,
}

impl ResourceLifetime {
    fn new(name: &str, first_level: u32) -> Self {
        Self {
            name: name.to_string(),
            first_level,
            usages: BTreeMap::new(),
            transient: None,
        }
    }

    fn insert(&mut self, level: u32, state: ResourceState, queue: QueueType) {
        self.usages
            .entry(level)
            .or_default()
            .insert(ResourceUsage { state, queue });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First dependency level referencing the resource
    pub fn first_level(&self) -> u32 {
        self.first_level
    }

    /// Last dependency level referencing the resource
    pub fn last_level(&self) -> u32 {
        self.usages
            .keys()
            .next_back()
            .copied()
            .map_or(self.first_level, |last| last.max(self.first_level))
    }

    pub fn usages(&self) -> &BTreeMap<u32, BTreeSet<ResourceUsage>> {
        &self.usages
    }

    pub fn usages_at(&self, level: u32) -> Option<&BTreeSet<ResourceUsage>> {
        self.usages.get(&level)
    }

    /// Levels with at least one writing usage, ascending
    pub fn write_levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.usages
            .iter()
            .filter(|(_, usages)| usages.iter().any(ResourceUsage::is_write))
            .map(|(&level, _)| level)
    }

    /// Last level reading the resource, `None` if nothing reads it
    pub fn last_read_level(&self) -> Option<u32> {
        self.usages
            .iter()
            .rev()
            .find(|(_, usages)| usages.iter().any(ResourceUsage::is_read))
            .map(|(&level, _)| level)
    }

    /// Check if the resource must be resident at `level`
    pub fn is_alive_at(&self, level: u32) -> bool {
        level >= self.first_level && level <= self.last_level()
    }

    /// Description of the resource if the graph owns it
    pub fn transient(&self) -> Option<&ResourceDesc> {
        self.transient.as_ref()
    }

    pub fn is_transient(&self) -> bool {
        self.transient.is_some()
    }

    fn validate(&self) -> CompileResult<()> {
        let ill_formed = |reason: String| CompileError::IllFormedResourceLifetime {
            resource: self.name.clone(),
            reason,
        };

        match self.usages.keys().next() {
            Some(&first_used) if first_used < self.first_level => Err(ill_formed(format!(
                "used at level {first_used} before its first level {}",
                self.first_level
            ))),
            None if self.transient.is_none() => Err(ill_formed("never used".to_string())),
            _ => Ok(()),
        }
    }
}

/// Build the lifetime table of a leveled graph.
///
/// `levels` is indexed like `nodes`. Records are returned sorted by resource name.
pub(crate) fn compute_lifetimes(
    nodes: &[RenderNode],
    levels: &[u32],
) -> CompileResult<Vec<ResourceLifetime>> {
    let mut records: BTreeMap<String, ResourceLifetime> = BTreeMap::new();
    let mut declared_by: HashMap<&str, usize> = HashMap::new();

    for (index, node) in nodes.iter().enumerate() {
        for transient in &node.transients {
            if let Some(&first) = declared_by.get(transient.name.as_str()) {
                return Err(CompileError::DuplicateTransientResource {
                    resource: transient.name.clone(),
                    first: nodes[first].name.clone(),
                    second: node.name.clone(),
                });
            }
            declared_by.insert(&transient.name, index);

            let record = records
                .entry(transient.name.clone())
                .or_insert_with(|| ResourceLifetime::new(&transient.name, levels[index]));
            record.transient = Some(transient.desc);
        }
    }

    let mut outputs: HashMap<String, &PassOutput> = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        let level = levels[index];
        for output in &node.outputs {
            let key = node.output_key(output);
            if outputs.contains_key(&key) {
                continue;
            }
            outputs.insert(key, output);

            let record = records
                .entry(output.resource.clone())
                .or_insert_with(|| ResourceLifetime::new(&output.resource, level));
            record.first_level = record.first_level.min(level);
            record.insert(level, output.state, node.queue);
        }
    }

    for (index, node) in nodes.iter().enumerate() {
        for input in &node.inputs {
            let output = outputs.get(input.source.as_str()).ok_or_else(|| {
                CompileError::UnresolvedInput {
                    node: node.name.clone(),
                    input: input.source.clone(),
                }
            })?;
            let record = records.get_mut(&output.resource).ok_or_else(|| {
                CompileError::IllFormedResourceLifetime {
                    resource: output.resource.clone(),
                    reason: format!("consumed by '{}' but never produced", node.name),
                }
            })?;
            record.insert(levels[index], input.state, node.queue);
        }
    }

    for record in records.values() {
        record.validate()?;
    }

    Ok(records.into_values().collect())
}
