use serde::Deserialize;

/// File-backed expectation persistence settings.
///
/// Read once when the [`ExpectationFileWatcher`](crate::ExpectationFileWatcher)
/// is constructed; there is no runtime toggling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersistenceConfig {
    /// Reload expectations whenever the initialization file changes.
    #[serde(default)]
    pub watch_initialization_json: bool,

    /// Path to the JSON expectation definitions file. May be unset or blank,
    /// which means "no file to load".
    #[serde(default)]
    pub initialization_json_path: Option<String>,
}

impl PersistenceConfig {
    /// The configured path, with unset and whitespace-only values collapsed
    /// to `None`.
    pub fn initialization_json_path(&self) -> Option<&str> {
        self.initialization_json_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
