//! Error types shared across the debugger and the execution backends.

use thiserror::Error;

/// Fatal session and hook errors.
///
/// Everything in here ends the enclosing computation, not just the session:
/// a debugger that loses its input stream has no way to ever reach `c`.
#[derive(Debug, Error)]
pub enum DebugError {
    /// The input stream ran out before the session reached `c`.
    #[error("end of input on debugger stream")]
    EndOfInput,
    /// The user asked the debugger to abort the computation (`q` / `quit`).
    #[error("debugger session aborted by user")]
    Quit,
    /// No debugger backend registered under the requested name.
    #[error("unknown debugger backend: {0}")]
    UnknownBackend(String),
    /// The stream handed to the hook failed underneath us.
    #[error("debugger stream I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the simulated execution backends.
#[derive(Debug, Error)]
pub enum ExecError {
    /// A debugger session inside the computation ended fatally.
    #[error(transparent)]
    Debug(#[from] DebugError),
    /// A replicated computation asked for more devices than the platform has.
    #[error("requires {needed} devices, platform has {available}")]
    DeviceCount { needed: usize, available: usize },
    /// Partitioned execution needs the cross-device callback mechanism.
    #[error("platform {0} does not support partitioned host callbacks")]
    PartitionedUnsupported(String),
    /// A batched transform was applied to a value with no leading axis.
    #[error("cannot map over a rank-0 value")]
    NotBatchable,
    /// Elementwise arithmetic over mismatched extents.
    #[error("shape mismatch: {left} vs {right} elements")]
    ShapeMismatch { left: usize, right: usize },
}

/// The kind tag on a recoverable in-session evaluation error.
///
/// Rendered into the transcript as `*** <kind>: <message>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    NameError,
    SyntaxError,
    TypeError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NameError => "NameError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
        };
        write!(f, "{s}")
    }
}

/// A recoverable expression-evaluation error.
///
/// Unlike [`DebugError`], these never end the session; the CLI backend
/// prints them inline and keeps reading commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EvalError {
    pub fn name(name: &str) -> Self {
        Self {
            kind: ErrorKind::NameError,
            message: format!("name '{name}' is not defined"),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SyntaxError,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::TypeError,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_error_message() {
        let e = EvalError::name("foo");
        assert_eq!(e.to_string(), "NameError: name 'foo' is not defined");
    }

    #[test]
    fn test_exec_error_wraps_debug_error() {
        let e: ExecError = DebugError::EndOfInput.into();
        assert!(matches!(e, ExecError::Debug(DebugError::EndOfInput)));
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::SyntaxError.to_string(), "SyntaxError");
        assert_eq!(ErrorKind::TypeError.to_string(), "TypeError");
    }
}
