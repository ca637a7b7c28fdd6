//! Debugger settings
//!
//! Process-wide defaults for the session: frame-depth cap and the source
//! listing window. Overridable through the environment (`JDB_NUM_FRAMES`,
//! `JDB_LIST_WINDOW`); a `num_frames` passed to the breakpoint hook wins
//! over both.

use serde::{Deserialize, Serialize};

/// Banner printed when a session opens.
pub const BANNER: &str = "Entering jdb:";

/// Prompt printed before every command read.
pub const PROMPT: &str = "(jdb) ";

/// Session defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum captured frame depth. `None` keeps the full stack.
    pub num_frames: Option<usize>,
    /// Maximum number of source lines one listing shows.
    pub list_window: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_frames: None,
            list_window: 11,
        }
    }
}

impl Settings {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(n) = read_env_usize("JDB_NUM_FRAMES") {
            settings.num_frames = Some(n);
        }
        if let Some(n) = read_env_usize("JDB_LIST_WINDOW") {
            // A window below 3 lines cannot show the marker in context.
            settings.list_window = n.max(3);
        }
        settings
    }
}

fn read_env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok()?.trim().parse().ok()
}
