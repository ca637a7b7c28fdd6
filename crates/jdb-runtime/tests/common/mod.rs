//! Shared helpers for the debugger scenario tests
//!
//! Thin wrappers over the command-replay harness: scripted stream pairs,
//! frame builders, and transcript assertions.

use jdb_runtime::{DebuggerIo, Frame, OutputCapture, SourceInfo};

// Re-export testing utilities
#[allow(unused_imports)]
pub use pretty_assertions::{assert_eq, assert_ne};

/// Scripted input stream plus captured output sink.
pub fn scripted(commands: &[&str]) -> (DebuggerIo, OutputCapture) {
    DebuggerIo::scripted(commands)
}

/// A frame as call-site instrumentation would record it: function name,
/// absolute first line, source text, and the active-line offset.
pub fn frame_at(function: &str, first_line: u32, src: &str, active: usize) -> Frame {
    Frame::new(
        function,
        SourceInfo::new("debugger_test.rs", first_line, src).at_line(active),
    )
}

/// Assert that `output` matches `pattern` (an unanchored regex, the
/// transcript-shaped assertions the scenario tests use for
/// backend-dependent output).
pub fn assert_transcript_matches(output: &str, pattern: &str) {
    let re = regex::Regex::new(pattern).expect("invalid transcript pattern");
    assert!(
        re.is_match(output),
        "transcript did not match\n--- pattern ---\n{pattern}\n--- output ---\n{output}"
    );
}
