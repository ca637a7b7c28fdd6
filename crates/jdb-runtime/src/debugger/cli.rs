//! The CLI debugger backend
//!
//! One session per breakpoint hit: prints the entry banner, then reads one
//! command per line from the session's input stream, writing every response
//! to the output stream after a `(jdb) ` prompt. `c` ends the session and
//! resumes the program; end-of-input and `q` are fatal to the whole
//! computation.

use crate::config::{Settings, BANNER, PROMPT};
use crate::debugger::command::Command;
use crate::debugger::io::DebuggerIo;
use crate::debugger::protocol::{
    Listing, ListingLine, SessionEvent, SessionTranscript, TracebackFrame,
};
use crate::debugger::DebuggerBackend;
use crate::error::DebugError;
use crate::expr;
use crate::frame::{Frame, FrameStack, NavOutcome};

/// The textual backend registered under `"cli"`.
#[derive(Debug, Default)]
pub struct CliDebugger;

impl DebuggerBackend for CliDebugger {
    fn name(&self) -> &str {
        "cli"
    }

    fn run(
        &self,
        io: &DebuggerIo,
        stack: FrameStack,
        settings: &Settings,
    ) -> Result<SessionTranscript, DebugError> {
        CliSession {
            io,
            stack,
            settings,
            transcript: SessionTranscript::default(),
        }
        .run()
    }
}

struct CliSession<'a> {
    io: &'a DebuggerIo,
    stack: FrameStack,
    settings: &'a Settings,
    transcript: SessionTranscript,
}

impl CliSession<'_> {
    fn run(mut self) -> Result<SessionTranscript, DebugError> {
        self.emit(SessionEvent::Banner)?;
        loop {
            self.io.write_str(PROMPT)?;
            let line = match self.io.read_line()? {
                Some(line) => line,
                None => return Err(DebugError::EndOfInput),
            };
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Command::Continue => {
                    self.emit(SessionEvent::Continued)?;
                    return Ok(self.transcript);
                }
                Command::Quit => return Err(DebugError::Quit),
                Command::Print(text) | Command::Eval(text) => self.print(&text)?,
                Command::List => {
                    let event = self.listing_event();
                    self.emit(event)?;
                }
                Command::Up => self.navigate(FrameStack::up, "At topmost frame")?,
                Command::Down => self.navigate(FrameStack::down, "At bottommost frame")?,
                Command::Backtrace => {
                    let event = self.traceback_event();
                    self.emit(event)?;
                }
            }
        }
    }

    fn print(&mut self, text: &str) -> Result<(), DebugError> {
        let event = match expr::evaluate(text, self.stack.current().scope()) {
            Ok(value) => SessionEvent::Result { repr: value.repr() },
            Err(e) => SessionEvent::Error {
                kind: e.kind,
                message: e.message,
            },
        };
        self.emit(event)
    }

    fn navigate(
        &mut self,
        mv: fn(&mut FrameStack) -> NavOutcome,
        boundary: &str,
    ) -> Result<(), DebugError> {
        let event = match mv(&mut self.stack) {
            NavOutcome::Moved => self.listing_event(),
            NavOutcome::AtTop | NavOutcome::AtBottom => SessionEvent::Boundary {
                message: boundary.to_string(),
            },
        };
        self.emit(event)
    }

    fn listing_event(&self) -> SessionEvent {
        SessionEvent::Listing(build_listing(self.stack.current(), self.settings.list_window))
    }

    fn traceback_event(&self) -> SessionEvent {
        let frames = self
            .stack
            .outermost_first()
            .map(|frame| TracebackFrame {
                file: frame.source().file.clone(),
                line: frame.source().active_line(),
                function: frame.function().to_string(),
            })
            .collect();
        SessionEvent::Traceback { frames }
    }

    /// Record the event and write its rendering.
    fn emit(&mut self, event: SessionEvent) -> Result<(), DebugError> {
        self.io.write_str(&render(&event))?;
        self.transcript.events.push(event);
        Ok(())
    }
}

/// Window `frame`'s recorded source around the active line.
fn build_listing(frame: &Frame, window: usize) -> Listing {
    let source = frame.source();
    let lines: Vec<&str> = source.text.lines().collect();
    let start = source.active.saturating_sub(window / 2);
    let end = (start + window).min(lines.len());
    Listing {
        file: source.file.clone(),
        line: source.active_line(),
        lines: lines[start..end]
            .iter()
            .enumerate()
            .map(|(i, text)| ListingLine {
                text: text.to_string(),
                active: start + i == source.active,
            })
            .collect(),
    }
}

/// Text rendering of one event, exactly as the transcript shows it.
fn render(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Banner => format!("{BANNER}\n"),
        SessionEvent::Result { repr } => format!("{repr}\n"),
        SessionEvent::Error { kind, message } => format!("*** {kind}: {message}\n"),
        SessionEvent::Boundary { message } => format!("{message}\n"),
        SessionEvent::Continued => String::new(),
        SessionEvent::Listing(listing) => {
            let mut out = format!("> {}({})\n", listing.file, listing.line);
            for line in &listing.lines {
                let marker = if line.active { "->  " } else { "    " };
                out.push_str(marker);
                out.push_str(&line.text);
                out.push('\n');
            }
            out.push('\n');
            out
        }
        SessionEvent::Traceback { frames } => {
            let mut out = String::from("Traceback:\n");
            for frame in frames {
                out.push_str(&format!(
                    "  {}({}) in {}\n",
                    frame.file, frame.line, frame.function
                ));
            }
            out
        }
    }
}
