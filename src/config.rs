use serde::{Deserialize, Serialize};

/// Environment variable that turns on debug mode.
pub const DEBUG_ENV: &str = "KUMITATE_DEBUG";

/// Engine-wide settings for a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Include offending values in error messages.
    pub debug: bool,
    /// Log the tree hierarchy once it is built.
    pub log_tree: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `debug` taken from `KUMITATE_DEBUG`.
    pub fn from_env() -> Self {
        let debug = std::env::var(DEBUG_ENV)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        Self {
            debug,
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_log_tree(mut self, log_tree: bool) -> Self {
        self.log_tree = log_tree;
        self
    }
}
