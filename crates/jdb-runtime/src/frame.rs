//! Debug frames
//!
//! A frame is the unit the debugger shows: one stack level's local and
//! global bindings plus a source location. Frames are captured explicitly
//! at the breakpoint call site by the instrumented program; there is no
//! live-stack introspection in an ahead-of-time-compiled runtime, so user
//! code (or the macro layer a staging compiler would emit) records the
//! bindings snapshot, the function's source text, and the active line.

use crate::scope::{Bindings, Scope};
use crate::value::Value;

/// Recorded source location for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// File the function was defined in.
    pub file: String,
    /// Absolute 1-based line number of the first line of `text`.
    pub first_line: u32,
    /// The function's source text as captured by instrumentation.
    pub text: String,
    /// 0-based offset into `text` of the active line (the breakpoint call
    /// for the innermost frame, the call site for enclosing frames).
    pub active: usize,
}

impl SourceInfo {
    pub fn new(file: impl Into<String>, first_line: u32, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            first_line,
            text: text.into(),
            active: 0,
        }
    }

    /// Set the active-line offset. Clamped to the recorded text.
    pub fn at_line(mut self, offset: usize) -> Self {
        self.active = offset.min(self.text.lines().count().saturating_sub(1));
        self
    }

    /// Absolute 1-based line number of the active line.
    pub fn active_line(&self) -> u32 {
        self.first_line + self.active as u32
    }
}

/// One stack level: bindings plus location.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    function: String,
    locals: Bindings,
    globals: Bindings,
    source: SourceInfo,
}

impl Frame {
    pub fn new(function: impl Into<String>, source: SourceInfo) -> Self {
        Self {
            function: function.into(),
            locals: Bindings::new(),
            globals: Bindings::new(),
            source,
        }
    }

    pub fn with_local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(name, value);
        self
    }

    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(name, value);
        self
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn scope(&self) -> Scope<'_> {
        Scope::new(&self.locals, &self.globals)
    }

    /// Copy of this frame with every bound array re-tagged as a host
    /// snapshot: what a staged computation's host callback delivers.
    pub fn to_host(&self) -> Self {
        Self {
            function: self.function.clone(),
            locals: self.locals.map_values(Value::to_host),
            globals: self.globals.map_values(Value::to_host),
            source: self.source.clone(),
        }
    }
}

/// The captured stack for one breakpoint hit, innermost frame first,
/// with the navigation cursor the `u`/`d` commands move.
#[derive(Debug, Clone)]
pub struct FrameStack {
    frames: Vec<Frame>,
    cursor: usize,
}

/// Outcome of a cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    /// Already at the outermost captured frame.
    AtTop,
    /// Already at the breakpoint frame.
    AtBottom,
}

impl FrameStack {
    /// Build a stack from innermost-first frames, keeping at most `limit`
    /// innermost frames when a limit is given.
    pub fn new(mut frames: Vec<Frame>, limit: Option<usize>) -> Self {
        assert!(!frames.is_empty(), "a breakpoint hit captures at least one frame");
        if let Some(limit) = limit {
            frames.truncate(limit.max(1));
        }
        Self { frames, cursor: 0 }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The frame the cursor is on.
    pub fn current(&self) -> &Frame {
        &self.frames[self.cursor]
    }

    /// Frames outermost-first, the order a traceback prints in.
    pub fn outermost_first(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().rev()
    }

    /// Move toward the outermost frame.
    pub fn up(&mut self) -> NavOutcome {
        if self.cursor + 1 >= self.frames.len() {
            NavOutcome::AtTop
        } else {
            self.cursor += 1;
            NavOutcome::Moved
        }
    }

    /// Move toward the breakpoint frame.
    pub fn down(&mut self) -> NavOutcome {
        if self.cursor == 0 {
            NavOutcome::AtBottom
        } else {
            self.cursor -= 1;
            NavOutcome::Moved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Array;

    fn frame(name: &str) -> Frame {
        Frame::new(name, SourceInfo::new("demo.rs", 1, "line one\nline two"))
            .with_local("x", Array::scalar_f32(1.0))
    }

    #[test]
    fn test_cursor_starts_at_breakpoint_frame() {
        let stack = FrameStack::new(vec![frame("f"), frame("g")], None);
        assert_eq!(stack.current().function(), "f");
    }

    #[test]
    fn test_up_then_down() {
        let mut stack = FrameStack::new(vec![frame("f"), frame("g")], None);
        assert_eq!(stack.up(), NavOutcome::Moved);
        assert_eq!(stack.current().function(), "g");
        assert_eq!(stack.down(), NavOutcome::Moved);
        assert_eq!(stack.current().function(), "f");
    }

    #[test]
    fn test_up_past_top_is_idempotent() {
        let mut stack = FrameStack::new(vec![frame("f"), frame("g")], None);
        stack.up();
        assert_eq!(stack.up(), NavOutcome::AtTop);
        assert_eq!(stack.up(), NavOutcome::AtTop);
        assert_eq!(stack.current().function(), "g");
    }

    #[test]
    fn test_down_at_bottom() {
        let mut stack = FrameStack::new(vec![frame("f")], None);
        assert_eq!(stack.down(), NavOutcome::AtBottom);
    }

    #[test]
    fn test_limit_keeps_innermost_frames() {
        let stack = FrameStack::new(vec![frame("f"), frame("g"), frame("h")], Some(2));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current().function(), "f");
        assert_eq!(
            stack.outermost_first().next().unwrap().function(),
            "g"
        );
    }

    #[test]
    fn test_active_line_clamps() {
        let src = SourceInfo::new("demo.rs", 10, "a\nb\nc").at_line(99);
        assert_eq!(src.active, 2);
        assert_eq!(src.active_line(), 12);
    }

    #[test]
    fn test_frame_to_host_retags_arrays() {
        let f = Frame::new("f", SourceInfo::new("demo.rs", 1, "x"))
            .with_local("x", Array::scalar_f32(1.0).to_device());
        let host = f.to_host();
        match host.scope().resolve("x").unwrap() {
            Value::Array(a) => assert_eq!(a.placement(), crate::value::Placement::Host),
            v => panic!("unexpected {v:?}"),
        }
    }
}
