//! Session event protocol
//!
//! Everything a session shows the user exists first as a [`SessionEvent`]
//! value; the CLI backend renders events to text, and the same events
//! serialize to JSON for tooling that wants a machine-readable transcript.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// One observable step of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Session opened: the entry banner.
    Banner,
    /// An evaluated expression's rendering.
    Result { repr: String },
    /// A recoverable in-session error (`*** <kind>: <message>`).
    Error { kind: ErrorKind, message: String },
    /// A source listing for one frame.
    Listing(Listing),
    /// The full frame stack, outermost first.
    Traceback { frames: Vec<TracebackFrame> },
    /// A frame-navigation boundary notice.
    Boundary { message: String },
    /// Session ended by `c`.
    Continued,
}

/// A windowed source listing with the active-line marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub file: String,
    /// Absolute 1-based number of the active line.
    pub line: u32,
    pub lines: Vec<ListingLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingLine {
    pub text: String,
    /// True on the line carrying the `->` marker.
    pub active: bool,
}

/// One traceback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracebackFrame {
    pub file: String,
    pub line: u32,
    pub function: String,
}

/// The ordered events of one completed session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionTranscript {
    pub events: Vec<SessionEvent>,
}

pub fn serialize_event(event: &SessionEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

pub fn deserialize_event(json: &str) -> serde_json::Result<SessionEvent> {
    serde_json::from_str(json)
}

pub fn serialize_transcript(transcript: &SessionTranscript) -> serde_json::Result<String> {
    serde_json::to_string(transcript)
}

pub fn deserialize_transcript(json: &str) -> serde_json::Result<SessionTranscript> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_roundtrip() {
        let event = SessionEvent::Error {
            kind: ErrorKind::NameError,
            message: "name 'foo' is not defined".into(),
        };
        let json = serialize_event(&event).unwrap();
        assert_eq!(deserialize_event(&json).unwrap(), event);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serialize_event(&SessionEvent::Banner).unwrap();
        assert_eq!(json, r#"{"event":"banner"}"#);
    }

    #[test]
    fn test_transcript_roundtrip() {
        let transcript = SessionTranscript {
            events: vec![
                SessionEvent::Banner,
                SessionEvent::Result {
                    repr: "array(2., dtype=float32)".into(),
                },
                SessionEvent::Continued,
            ],
        };
        let json = serialize_transcript(&transcript).unwrap();
        assert_eq!(deserialize_transcript(&json).unwrap(), transcript);
    }

    #[test]
    fn test_listing_roundtrip() {
        let event = SessionEvent::Listing(Listing {
            file: "demo.rs".into(),
            line: 12,
            lines: vec![
                ListingLine {
                    text: "let y = x.sin();".into(),
                    active: false,
                },
                ListingLine {
                    text: "breakpoint(...);".into(),
                    active: true,
                },
            ],
        });
        let json = serialize_event(&event).unwrap();
        assert_eq!(deserialize_event(&json).unwrap(), event);
    }
}
