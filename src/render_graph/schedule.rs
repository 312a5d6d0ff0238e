//! Compiled schedule and fence assignment.
//!
//! Passes are stored grouped by dependency level. Every surviving cross-queue
//! edge producer→consumer becomes an [`ExitSync`] on the producer pointing at
//! one of the consumer's two enter-fence slots.

use std::fmt::{self, Write as _};
use std::ops::Range;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::backend::types::{QueueMask, QueueType};
use crate::render_graph::pass::{PassExecutor, PassId, RenderNode};
use crate::render_graph::resource::ResourceLifetime;
use crate::render_graph::sort::DependencyLevels;
use crate::render_graph::sync::FenceSlot;

/// Fence publication a pass performs after it executes
#[derive(Debug, Clone)]
pub struct ExitSync {
    /// Queue of the dependent pass
    pub target: QueueType,
    /// Enter-fence slot of the dependent pass
    pub slot: Arc<FenceSlot>,
}

/// Immutable, compiled form of a render node
pub struct PassDescriptor {
    pub(crate) id: PassId,
    pub(crate) name: String,
    pub(crate) queue: QueueType,
    pub(crate) level: u32,
    pub(crate) enter_sync: QueueMask,
    pub(crate) enter_fences: [Arc<FenceSlot>; 2],
    pub(crate) exit_syncs: Vec<ExitSync>,
    pub(crate) exit_mask: QueueMask,
    pub(crate) sync_dependencies: Vec<PassId>,
    pub(crate) executor: Box<dyn PassExecutor>,
}

impl PassDescriptor {
    pub fn id(&self) -> PassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue(&self) -> QueueType {
        self.queue
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Foreign queues this pass waits on before it starts
    pub fn enter_sync(&self) -> QueueMask {
        self.enter_sync
    }

    /// Slot holding the value of `queue`'s fence this pass waits for
    pub fn enter_fence(&self, queue: QueueType) -> Option<&FenceSlot> {
        self.queue
            .other_slot(queue)
            .map(|slot| self.enter_fences[slot].as_ref())
    }

    pub fn exit_syncs(&self) -> &[ExitSync] {
        &self.exit_syncs
    }

    /// Queues waiting on this pass; non-empty means the pass signals its fence
    pub fn exit_mask(&self) -> QueueMask {
        self.exit_mask
    }

    pub fn signals(&self) -> bool {
        !self.exit_mask.is_empty()
    }

    /// Producers this pass explicitly waits on after culling
    pub fn sync_dependencies(&self) -> &[PassId] {
        &self.sync_dependencies
    }
}

impl fmt::Debug for PassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("queue", &self.queue)
            .field("level", &self.level)
            .field("enter_sync", &self.enter_sync)
            .field("exit_mask", &self.exit_mask)
            .field("sync_dependencies", &self.sync_dependencies)
            .finish_non_exhaustive()
    }
}

/// A compiled render graph ready for execution every frame.
#[derive(Debug)]
pub struct CompiledGraph {
    /// Passes grouped by level, declaration order inside a level
    pub(crate) passes: Vec<PassDescriptor>,
    /// `passes[level_offsets[l]..level_offsets[l + 1]]` is level `l`
    level_offsets: Vec<usize>,
    /// Position in `passes` of every pass id
    positions: Vec<usize>,
    lifetimes: Vec<ResourceLifetime>,
    pub(crate) frame: AtomicU64,
}

impl CompiledGraph {
    /// Assign fences for the surviving syncs and group passes by level.
    ///
    /// `syncs[c]` lists the producers node `c` must explicitly wait on.
    pub(crate) fn assemble(
        nodes: Vec<RenderNode>,
        levels: &DependencyLevels,
        syncs: &[Vec<usize>],
        lifetimes: Vec<ResourceLifetime>,
    ) -> Self {
        let count = nodes.len();
        let enter_fences: Vec<[Arc<FenceSlot>; 2]> = (0..count)
            .map(|_| [Arc::new(FenceSlot::new()), Arc::new(FenceSlot::new())])
            .collect();

        let mut enter_sync = vec![QueueMask::empty(); count];
        let mut exit_syncs: Vec<Vec<ExitSync>> = (0..count).map(|_| Vec::new()).collect();
        let mut sync_dependencies: Vec<Vec<PassId>> = vec![Vec::new(); count];

        for (consumer, producers) in syncs.iter().enumerate() {
            let consumer_queue = nodes[consumer].queue;
            for &producer in producers {
                let producer_queue = nodes[producer].queue;
                let Some(slot) = consumer_queue.other_slot(producer_queue) else {
                    continue;
                };
                exit_syncs[producer].push(ExitSync {
                    target: consumer_queue,
                    slot: Arc::clone(&enter_fences[consumer][slot]),
                });
                enter_sync[consumer] |= producer_queue.mask();
                sync_dependencies[consumer].push(PassId::new(producer));
            }
        }

        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|&node| (levels.levels[node], node));

        let mut level_offsets = Vec::with_capacity(levels.level_count as usize + 1);
        for (position, &node) in order.iter().enumerate() {
            while level_offsets.len() <= levels.levels[node] as usize {
                level_offsets.push(position);
            }
        }
        level_offsets.push(count);

        let mut positions = vec![0; count];
        for (position, &node) in order.iter().enumerate() {
            positions[node] = position;
        }

        let mut descriptors: Vec<Option<PassDescriptor>> = nodes
            .into_iter()
            .zip(enter_fences)
            .zip(exit_syncs)
            .enumerate()
            .map(|(index, ((node, enter_fences), exit_syncs))| {
                let exit_mask = exit_syncs
                    .iter()
                    .fold(QueueMask::empty(), |mask, exit| mask | exit.target.mask());
                Some(PassDescriptor {
                    id: PassId::new(index),
                    name: node.name,
                    queue: node.queue,
                    level: levels.levels[index],
                    enter_sync: enter_sync[index],
                    enter_fences,
                    exit_syncs,
                    exit_mask,
                    sync_dependencies: std::mem::take(&mut sync_dependencies[index]),
                    executor: node.executor,
                })
            })
            .collect();

        let passes = order
            .iter()
            .filter_map(|&node| descriptors[node].take())
            .collect();

        Self {
            passes,
            level_offsets,
            positions,
            lifetimes,
            frame: AtomicU64::new(0),
        }
    }

    /// Number of dependency levels
    pub fn level_count(&self) -> usize {
        self.level_offsets.len() - 1
    }

    pub(crate) fn level_range(&self, level: usize) -> Range<usize> {
        self.level_offsets[level]..self.level_offsets[level + 1]
    }

    /// Passes of one level in execution order
    pub fn level(&self, level: usize) -> &[PassDescriptor] {
        &self.passes[self.level_range(level)]
    }

    pub fn levels(&self) -> impl Iterator<Item = &[PassDescriptor]> + '_ {
        (0..self.level_count()).map(move |level| self.level(level))
    }

    /// All passes in execution order
    pub fn passes(&self) -> &[PassDescriptor] {
        &self.passes
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_by_id(&self, id: PassId) -> Option<&PassDescriptor> {
        self.positions
            .get(id.index())
            .map(|&position| &self.passes[position])
    }

    pub fn pass(&self, name: &str) -> Option<&PassDescriptor> {
        self.passes.iter().find(|pass| pass.name == name)
    }

    /// Names of the producers `name` explicitly waits on
    pub fn sync_dependency_names(&self, name: &str) -> Vec<&str> {
        self.pass(name)
            .map(|pass| {
                pass.sync_dependencies
                    .iter()
                    .filter_map(|&id| self.pass_by_id(id))
                    .map(PassDescriptor::name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of explicit cross-queue waits per frame
    pub fn sync_edge_count(&self) -> usize {
        self.passes.iter().map(|pass| pass.exit_syncs.len()).sum()
    }

    /// Lifetime table for the external allocator, sorted by resource name
    pub fn resource_lifetimes(&self) -> &[ResourceLifetime] {
        &self.lifetimes
    }

    pub fn resource_lifetime(&self, name: &str) -> Option<&ResourceLifetime> {
        self.lifetimes
            .binary_search_by(|lifetime| lifetime.name().cmp(name))
            .ok()
            .map(|index| &self.lifetimes[index])
    }

    /// Human readable plan, one line per pass
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (level, passes) in self.levels().enumerate() {
            let _ = writeln!(out, "level {level}:");
            for pass in passes {
                let waits: Vec<&str> = pass
                    .sync_dependencies
                    .iter()
                    .filter_map(|&id| self.pass_by_id(id))
                    .map(PassDescriptor::name)
                    .collect();
                let _ = write!(out, "  [{}] {}", pass.queue, pass.name);
                if !waits.is_empty() {
                    let _ = write!(out, " waits({}: {})", pass.enter_sync, waits.join(", "));
                }
                if pass.signals() {
                    let _ = write!(out, " signals({})", pass.exit_mask);
                }
                out.push('\n');
            }
        }
        out
    }
}
