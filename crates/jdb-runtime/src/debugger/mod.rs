//! jdb debugger infrastructure.
//!
//! The [`breakpoint`] hook is the one instrumentation point user programs
//! call: it captures the frame stack from the [`ExecContext`], applies the
//! execution mode's placement rules, serializes against sibling sessions,
//! and hands the session to a registered [`DebuggerBackend`].
//!
//! # Quick-start
//!
//! ```rust
//! use jdb_runtime::debugger::{breakpoint, BreakpointOptions, DebuggerIo};
//! use jdb_runtime::exec::Runtime;
//! use jdb_runtime::frame::{Frame, SourceInfo};
//! use jdb_runtime::value::Array;
//!
//! let (io, capture) = DebuggerIo::scripted(&["p x", "c"]);
//! let rt = Runtime::cpu(2);
//! rt.run(
//!     |ctx, x| {
//!         let y = x.sin();
//!         let frame = Frame::new("f", SourceInfo::new("demo.rs", 1, "let y = x.sin();"))
//!             .with_local("x", &x)
//!             .with_local("y", &y);
//!         breakpoint(ctx, &io, frame, &BreakpointOptions::default())?;
//!         Ok(y)
//!     },
//!     &Array::scalar_f32(2.0),
//! )
//! .unwrap();
//! assert!(capture.contents().starts_with("Entering jdb:\n"));
//! ```

pub mod cli;
pub mod command;
pub mod io;
pub mod ordering;
pub mod protocol;

pub use cli::CliDebugger;
pub use command::Command;
pub use io::{fake_stdin_stdout, DebuggerIo, OutputCapture};
pub use ordering::SessionGate;
pub use protocol::{SessionEvent, SessionTranscript};

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::config::Settings;
use crate::error::DebugError;
use crate::exec::{ExecContext, ExecMode};
use crate::frame::{Frame, FrameStack};

// ── Backend registry ──────────────────────────────────────────────────────────

/// A debugger user interface bound to a session's streams.
pub trait DebuggerBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Run one full session over `stack`, returning its event transcript.
    fn run(
        &self,
        io: &DebuggerIo,
        stack: FrameStack,
        settings: &Settings,
    ) -> Result<SessionTranscript, DebugError>;
}

struct BackendEntry {
    priority: i32,
    backend: Arc<dyn DebuggerBackend>,
}

fn registry() -> &'static RwLock<HashMap<String, BackendEntry>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, BackendEntry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert(
            "cli".to_string(),
            BackendEntry {
                priority: 10,
                backend: Arc::new(CliDebugger),
            },
        );
        RwLock::new(map)
    })
}

/// Register (or replace) a debugger backend under `name`.
///
/// When [`BreakpointOptions::backend`] is unset, the highest-priority
/// registered backend handles the session.
pub fn register_backend(name: &str, priority: i32, backend: Arc<dyn DebuggerBackend>) {
    registry().write().unwrap().insert(
        name.to_string(),
        BackendEntry { priority, backend },
    );
}

fn resolve_backend(name: Option<&str>) -> Result<Arc<dyn DebuggerBackend>, DebugError> {
    let map = registry().read().unwrap();
    match name {
        Some(name) => map
            .get(name)
            .map(|entry| Arc::clone(&entry.backend))
            .ok_or_else(|| DebugError::UnknownBackend(name.to_string())),
        None => map
            .values()
            .max_by_key(|entry| entry.priority)
            .map(|entry| Arc::clone(&entry.backend))
            .ok_or_else(|| DebugError::UnknownBackend("<none>".to_string())),
    }
}

// ── Breakpoint hook ───────────────────────────────────────────────────────────

/// Options for one breakpoint call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointOptions {
    /// Backend name; `None` picks the highest-priority registered backend.
    pub backend: Option<String>,
    /// Force deterministic, index-ascending session order across the
    /// lanes/replicas of a parallel unit.
    pub ordered: bool,
    /// Keep only the innermost N captured frames.
    pub num_frames: Option<usize>,
}

impl BreakpointOptions {
    /// The textual backend, explicitly.
    pub fn cli() -> Self {
        Self {
            backend: Some("cli".to_string()),
            ..Self::default()
        }
    }

    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    pub fn num_frames(mut self, limit: usize) -> Self {
        self.num_frames = Some(limit);
        self
    }
}

fn settings() -> &'static Settings {
    static SETTINGS: OnceLock<Settings> = OnceLock::new();
    SETTINGS.get_or_init(Settings::from_env)
}

/// Suspend the computation and open an interactive session on `io`.
///
/// `frame` is the innermost frame, captured by the caller at the call
/// site; enclosing instrumented frames come from `ctx`. Blocks until the
/// session reaches `c`; end-of-input and `q` return fatal errors that the
/// enclosing backend propagates out of the whole computation.
pub fn breakpoint(
    ctx: &ExecContext,
    io: &DebuggerIo,
    frame: Frame,
    opts: &BreakpointOptions,
) -> Result<(), DebugError> {
    let backend = resolve_backend(opts.backend.as_deref())?;

    let mut frames = ctx.capture_stack(frame);
    if ctx.mode() == ExecMode::Compiled {
        // The host callback delivers snapshots, not device buffers.
        frames = frames.iter().map(Frame::to_host).collect();
    }
    let settings = settings();
    let limit = opts.num_frames.or(settings.num_frames);
    let stack = FrameStack::new(frames, limit);

    // Ordered sessions wait for every lower-indexed sibling lane to finish
    // this program point; the session mutex then guarantees exclusive use
    // of the streams either way.
    let _order_guard = match (opts.ordered, ctx.order_slot()) {
        (true, Some((gate, lane))) => Some(gate.enter(lane, ctx.next_hit())),
        _ => {
            ctx.next_hit();
            None
        }
    };
    let _session_guard = io.lock_session();

    backend.run(io, stack, settings).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::Runtime;
    use crate::frame::SourceInfo;
    use crate::value::Array;

    fn demo_frame(x: &Array) -> Frame {
        Frame::new("f", SourceInfo::new("demo.rs", 1, "breakpoint(...)")).with_local("x", x)
    }

    #[test]
    fn test_unknown_backend_errors() {
        let (io, _) = DebuggerIo::scripted(&["c"]);
        let rt = Runtime::cpu(1);
        let opts = BreakpointOptions {
            backend: Some("colab".to_string()),
            ..Default::default()
        };
        let err = rt
            .run(
                |ctx, x| {
                    breakpoint(ctx, &io, demo_frame(&x), &opts)?;
                    Ok(x)
                },
                &Array::scalar_f32(1.0),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ExecError::Debug(DebugError::UnknownBackend(name)) if name == "colab"
        ));
    }

    #[test]
    fn test_default_backend_is_cli() {
        let (io, capture) = DebuggerIo::scripted(&["c"]);
        let rt = Runtime::cpu(1);
        rt.run(
            |ctx, x| {
                breakpoint(ctx, &io, demo_frame(&x), &BreakpointOptions::default())?;
                Ok(x)
            },
            &Array::scalar_f32(1.0),
        )
        .unwrap();
        assert_eq!(capture.contents(), "Entering jdb:\n(jdb) ");
    }

    /// A backend that resumes immediately without touching the streams.
    struct AutoContinue;

    impl DebuggerBackend for AutoContinue {
        fn name(&self) -> &str {
            "auto"
        }

        fn run(
            &self,
            _io: &DebuggerIo,
            _stack: FrameStack,
            _settings: &Settings,
        ) -> Result<SessionTranscript, DebugError> {
            Ok(SessionTranscript {
                events: vec![SessionEvent::Continued],
            })
        }
    }

    #[test]
    fn test_registered_backend_is_selectable() {
        // Low priority keeps "cli" the default for every other test in
        // this process.
        register_backend("auto", 1, Arc::new(AutoContinue));

        let (io, capture) = DebuggerIo::scripted(&[]);
        let rt = Runtime::cpu(1);
        let opts = BreakpointOptions {
            backend: Some("auto".to_string()),
            ..Default::default()
        };
        rt.run(
            |ctx, x| {
                breakpoint(ctx, &io, demo_frame(&x), &opts)?;
                Ok(x)
            },
            &Array::scalar_f32(1.0),
        )
        .unwrap();
        assert_eq!(capture.contents(), "");
    }

    #[test]
    fn test_explicit_cli_backend() {
        let opts = BreakpointOptions::cli();
        assert_eq!(opts.backend.as_deref(), Some("cli"));
        assert!(!opts.ordered);
    }

    #[test]
    fn test_options_builders() {
        let opts = BreakpointOptions::cli().ordered(true).num_frames(2);
        assert!(opts.ordered);
        assert_eq!(opts.num_frames, Some(2));
    }
}
