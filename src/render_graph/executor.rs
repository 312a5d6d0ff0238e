//! Frame execution of a compiled graph.
//!
//! Passes run level by level on the calling thread. Cross-queue waits are
//! recorded on the device, the host never blocks while a frame executes.

use std::sync::atomic::Ordering;

use crate::backend::traits::{Device, QueueFence};
use crate::backend::types::QueueType;
use crate::render_graph::error::{ExecuteError, ExecuteResult};
use crate::render_graph::pass::PassContext;
use crate::render_graph::schedule::{CompiledGraph, PassDescriptor};

/// Summary of one executed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedFrame {
    /// Index of the frame, starting at 0
    pub frame: u64,
    pub passes_executed: usize,
    /// Device-side waits recorded during the frame
    pub waits_recorded: usize,
    /// Last value each queue fence was signaled with, by queue index
    pub signals: [Option<u64>; 3],
}

impl ExecutedFrame {
    /// Last fence value `queue` signaled in this frame
    pub fn signal(&self, queue: QueueType) -> Option<u64> {
        self.signals[queue.index()]
    }

    /// Block the host until every fence signaled in this frame completed.
    ///
    /// A device failing the wait surfaces as [`ExecuteError::Device`].
    pub fn wait<D: Device>(&self, device: &D) -> ExecuteResult<()> {
        for queue in QueueType::ALL {
            if let Some(value) = self.signal(queue) {
                device.fence(queue).wait(value)?;
            }
        }
        Ok(())
    }
}

impl CompiledGraph {
    /// Execute every pass of the graph once.
    ///
    /// A failing pass aborts the frame. Passes already executed are not rolled
    /// back and the frame index is consumed either way.
    pub fn execute<D: Device>(&self, device: &D) -> ExecuteResult<ExecutedFrame> {
        let frame = self.frame.fetch_add(1, Ordering::Relaxed);
        let mut report = ExecutedFrame {
            frame,
            passes_executed: 0,
            waits_recorded: 0,
            signals: [None; 3],
        };

        log::trace!(
            "Executing frame {} on {} ({} passes, {} levels)",
            frame,
            device.name(),
            self.pass_count(),
            self.level_count()
        );

        for level in 0..self.level_count() {
            for pass in &self.passes[self.level_range(level)] {
                self.execute_pass(device, pass, &mut report)?;
            }
        }

        Ok(report)
    }

    /// Number of frames executed so far, failed ones included
    pub fn frames_executed(&self) -> u64 {
        self.frame.load(Ordering::Relaxed)
    }

    fn execute_pass<D: Device>(
        &self,
        device: &D,
        pass: &PassDescriptor,
        report: &mut ExecutedFrame,
    ) -> ExecuteResult<()> {
        for other in pass.enter_sync.queues() {
            let Some(slot) = pass.enter_fence(other) else {
                continue;
            };
            let value = slot.value();
            device.fence(other).wait_from_queue(pass.queue, value);
            report.waits_recorded += 1;
        }

        let ctx = PassContext {
            id: pass.id,
            name: &pass.name,
            queue: pass.queue,
            level: pass.level,
            frame: report.frame,
        };
        pass.executor
            .execute(&ctx)
            .map_err(|source| ExecuteError::PassFailed {
                pass: pass.name.clone(),
                frame: report.frame,
                source,
            })?;
        report.passes_executed += 1;

        if pass.signals() {
            let value = device.fence(pass.queue).signal_from_queue(pass.queue);
            report.signals[pass.queue.index()] = Some(value);
            for exit in &pass.exit_syncs {
                exit.slot.raise(value);
            }
        }

        Ok(())
    }
}
