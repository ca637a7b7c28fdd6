//! Per-invocation execution context
//!
//! Every backend invocation of user code gets an [`ExecContext`]: the
//! execution mode (eager host dispatch vs. staged/compiled), the parallel
//! unit the invocation belongs to, and the instrumented frame stack the
//! breakpoint hook captures from. One context belongs to exactly one
//! lane/replica; contexts are never shared across threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::debugger::ordering::SessionGate;
use crate::frame::Frame;

/// How the enclosing computation is being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Host dispatch; the debugger sees device-resident values.
    Eager,
    /// Staged execution; the debugger sees host snapshots delivered by the
    /// runtime's host-callback mechanism.
    Compiled,
}

/// The parallel unit one invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelUnit {
    /// Not part of any parallel transform.
    None,
    /// One lane of a vectorized (batched) execution.
    Lane { index: usize, count: usize },
    /// One replica of a multi-device execution.
    Replica { index: usize, count: usize },
    /// A partitioned execution over `devices` devices, seen globally.
    Shard { devices: usize },
}

impl ParallelUnit {
    fn lane_index(&self) -> usize {
        match self {
            ParallelUnit::Lane { index, .. } | ParallelUnit::Replica { index, .. } => *index,
            _ => 0,
        }
    }
}

/// Invocation-scoped state threaded through instrumented user code.
#[derive(Debug)]
pub struct ExecContext {
    mode: ExecMode,
    unit: ParallelUnit,
    /// Enclosing instrumented frames, outermost first.
    frames: Mutex<Vec<Frame>>,
    /// Shared with sibling lanes when the invocation is part of a
    /// parallel unit; drives `ordered` session interleaving.
    gate: Option<Arc<SessionGate>>,
    /// Breakpoint hits seen by this lane so far.
    hits: AtomicUsize,
}

impl ExecContext {
    pub(crate) fn new(mode: ExecMode, unit: ParallelUnit, gate: Option<Arc<SessionGate>>) -> Self {
        Self {
            mode,
            unit,
            frames: Mutex::new(Vec::new()),
            gate,
            hits: AtomicUsize::new(0),
        }
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub fn unit(&self) -> ParallelUnit {
        self.unit
    }

    /// Record an enclosing frame for the dynamic extent of the returned
    /// guard. Instrumented callers push their frame before calling in.
    pub fn push_frame(&self, frame: Frame) -> FrameGuard<'_> {
        self.frames.lock().unwrap().push(frame);
        FrameGuard { ctx: self }
    }

    /// The stack a breakpoint hit captures: `innermost` plus every pushed
    /// enclosing frame, innermost first.
    pub(crate) fn capture_stack(&self, innermost: Frame) -> Vec<Frame> {
        let mut stack = vec![innermost];
        let held = self.frames.lock().unwrap();
        stack.extend(held.iter().rev().cloned());
        stack
    }

    /// The gate and lane index an ordered session synchronizes on, if this
    /// invocation is part of a parallel unit.
    pub(crate) fn order_slot(&self) -> Option<(&SessionGate, usize)> {
        self.gate
            .as_deref()
            .map(|gate| (gate, self.unit.lane_index()))
    }

    /// Bump and return this lane's breakpoint-hit counter.
    pub(crate) fn next_hit(&self) -> usize {
        self.hits.fetch_add(1, Ordering::SeqCst)
    }
}

/// Pops the pushed frame when the instrumented call returns.
#[derive(Debug)]
pub struct FrameGuard<'a> {
    ctx: &'a ExecContext,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.ctx.frames.lock().unwrap().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SourceInfo;

    fn frame(name: &str) -> Frame {
        Frame::new(name, SourceInfo::new("demo.rs", 1, "x"))
    }

    #[test]
    fn test_capture_stack_is_innermost_first() {
        let ctx = ExecContext::new(ExecMode::Eager, ParallelUnit::None, None);
        let _outer = ctx.push_frame(frame("g"));
        let _inner = ctx.push_frame(frame("h"));
        let stack = ctx.capture_stack(frame("f"));
        let names: Vec<&str> = stack.iter().map(|f| f.function()).collect();
        assert_eq!(names, vec!["f", "h", "g"]);
    }

    #[test]
    fn test_frame_guard_pops_on_drop() {
        let ctx = ExecContext::new(ExecMode::Eager, ParallelUnit::None, None);
        {
            let _guard = ctx.push_frame(frame("g"));
            assert_eq!(ctx.capture_stack(frame("f")).len(), 2);
        }
        assert_eq!(ctx.capture_stack(frame("f")).len(), 1);
    }

    #[test]
    fn test_hit_counter_increments() {
        let ctx = ExecContext::new(ExecMode::Compiled, ParallelUnit::None, None);
        assert_eq!(ctx.next_hit(), 0);
        assert_eq!(ctx.next_hit(), 1);
    }

    #[test]
    fn test_order_slot_requires_gate() {
        let ctx = ExecContext::new(ExecMode::Compiled, ParallelUnit::None, None);
        assert!(ctx.order_slot().is_none());

        let gate = Arc::new(SessionGate::new(2));
        let ctx = ExecContext::new(
            ExecMode::Compiled,
            ParallelUnit::Replica { index: 1, count: 2 },
            Some(gate),
        );
        let (_, lane) = ctx.order_slot().unwrap();
        assert_eq!(lane, 1);
    }
}
