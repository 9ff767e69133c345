use serde::{Deserialize, Serialize};

/// Why the live expectation set was replaced.
///
/// Attached to every matcher update so listeners can tell file-driven
/// updates apart from programmatic ones. The matcher does not interpret the
/// cause beyond passing it through to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cause {
    /// The watched initialization file was modified.
    FileWatcher,
    /// The initialization file was loaded at startup.
    FileInitializer,
    /// The expectation API replaced the set.
    Api,
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cause::FileWatcher => write!(f, "FILE_WATCHER"),
            Cause::FileInitializer => write!(f, "FILE_INITIALIZER"),
            Cause::Api => write!(f, "API"),
        }
    }
}
