//! Session streams
//!
//! The breakpoint hook is handed one input stream and one output stream,
//! shared by every session the computation opens. [`DebuggerIo`] wraps the
//! pair behind a session-level mutex: a session owns both streams for its
//! whole lifetime, so transcripts from parallel lanes interleave at session
//! granularity, never mid-line.
//!
//! [`fake_stdin_stdout`] is the command-replay harness: a readable stream
//! yielding each scripted command followed by a newline, rewound to offset
//! zero, plus an independent capture sink.

use std::io::{self, BufRead, Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, lockable stream pair.
#[derive(Clone)]
pub struct DebuggerIo {
    shared: Arc<IoShared>,
}

struct IoShared {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
    session: Mutex<()>,
}

impl std::fmt::Debug for DebuggerIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebuggerIo").finish_non_exhaustive()
    }
}

impl DebuggerIo {
    pub fn new(
        input: impl BufRead + Send + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(IoShared {
                input: Mutex::new(Box::new(input)),
                output: Mutex::new(Box::new(output)),
                session: Mutex::new(()),
            }),
        }
    }

    /// Harness constructor: scripted input plus a captured output sink.
    pub fn scripted(commands: &[&str]) -> (Self, OutputCapture) {
        let (stdin, capture) = fake_stdin_stdout(commands);
        let io = Self::new(stdin, capture.clone());
        (io, capture)
    }

    /// Take exclusive ownership of the stream pair for one session.
    pub(crate) fn lock_session(&self) -> MutexGuard<'_, ()> {
        self.shared.session.lock().unwrap()
    }

    /// Read one command line, without its line terminator.
    ///
    /// `None` means the input stream is exhausted; fatal to the caller.
    pub(crate) fn read_line(&self) -> io::Result<Option<String>> {
        let mut input = self.shared.input.lock().unwrap();
        let mut line = String::new();
        let n = input.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    pub(crate) fn write_str(&self, s: &str) -> io::Result<()> {
        let mut output = self.shared.output.lock().unwrap();
        output.write_all(s.as_bytes())?;
        output.flush()
    }
}

/// Build the fake stream pair the scenario tests replay commands through.
///
/// Each command is written followed by a newline and the stream is rewound
/// to offset zero; the capture sink starts empty. Pure construction; no
/// error conditions.
pub fn fake_stdin_stdout(commands: &[&str]) -> (Cursor<Vec<u8>>, OutputCapture) {
    let mut buf = Vec::new();
    for command in commands {
        buf.extend_from_slice(command.as_bytes());
        buf.push(b'\n');
    }
    (Cursor::new(buf), OutputCapture::new())
}

/// Cloneable in-memory output sink.
#[derive(Debug, Clone, Default)]
pub struct OutputCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl Write for OutputCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
