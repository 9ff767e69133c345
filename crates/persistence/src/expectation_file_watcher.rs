use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use mockd_core::{Cause, Expectation};
use mockd_matcher::MockMatcher;
use mockd_serialization::ExpectationSerializer;

use crate::config::PersistenceConfig;
use crate::error::PersistenceError;
use crate::file_reader;
use crate::file_watcher::FileWatcher;

/// Keeps the live expectation set in sync with the JSON initialization file.
///
/// When `watch_initialization_json` is enabled, a filesystem watch is
/// established on the configured path and every change notification runs the
/// reload pipeline: read the file, parse it as a single expectation object or
/// an array of them, and publish the result to the matcher as one full
/// replacement tagged [`Cause::FileWatcher`].
///
/// Faults are contained: a file that cannot be read or parsed is logged and
/// treated as defining zero expectations, and a failure to establish the
/// watch itself leaves the watcher usable for manual
/// [`reload`](ExpectationFileWatcher::reload) calls. Construction never
/// fails and no fault escapes to the notification thread.
pub struct ExpectationFileWatcher {
    // `None` when watching is disabled in configuration; the watcher is then
    // fully inert.
    active: Option<ActiveWatcher>,
}

/// Everything the enabled variant owns. Built only when configuration turns
/// watching on, so none of it is ever observed half-initialized.
struct ActiveWatcher {
    reloader: Arc<Reloader>,
    // Absent when there is no path to watch or the watch could not be
    // established.
    watch: Option<FileWatcher>,
}

impl ExpectationFileWatcher {
    /// Build the watcher from configuration, wiring reloads into `matcher`.
    pub fn new(config: &PersistenceConfig, matcher: Arc<MockMatcher>) -> Self {
        if !config.watch_initialization_json {
            return Self { active: None };
        }

        let path = config.initialization_json_path().map(str::to_owned);
        let reloader = Arc::new(Reloader {
            path: path.clone(),
            serializer: ExpectationSerializer::new(),
            matcher,
        });

        let watch = match path {
            Some(path) => match create_watch(&path, &reloader) {
                Ok(watch) => {
                    info!(path = %path, "created expectation file watcher");
                    Some(watch)
                }
                Err(e) => {
                    error!(
                        path = %path,
                        error = %e,
                        "failed to create expectation file watcher"
                    );
                    None
                }
            },
            None => {
                debug!("no initialization file path configured, nothing to watch");
                None
            }
        };

        Self {
            active: Some(ActiveWatcher { reloader, watch }),
        }
    }

    /// Run the reload pipeline once, independent of any filesystem
    /// notification. No-op when watching is disabled in configuration.
    pub fn reload(&self) {
        if let Some(active) = &self.active {
            active.reloader.reload();
        }
    }

    /// Whether a filesystem watch is established and delivering
    /// notifications.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .and_then(|active| active.watch.as_ref())
            .is_some_and(FileWatcher::is_running)
    }

    /// Stop delivering change notifications.
    ///
    /// Idempotent, and safe to call when watching was never enabled. A
    /// reload already in progress is allowed to complete.
    pub fn stop(&self) {
        if let Some(watch) = self.active.as_ref().and_then(|active| active.watch.as_ref()) {
            watch.set_running(false);
        }
    }
}

/// Subscribe to changes of `path`, running the reload pipeline on every
/// change notification and logging watch-level faults without interrupting
/// the subscription.
fn create_watch(path: &str, reloader: &Arc<Reloader>) -> Result<FileWatcher, PersistenceError> {
    let on_change = {
        let reloader = Arc::clone(reloader);
        let path = path.to_owned();
        move || {
            debug!(
                path = %path,
                "expectation file watcher detected modification, updating expectations"
            );
            reloader.reload();
        }
    };
    let on_error = {
        let path = path.to_owned();
        move |e: notify::Error| {
            warn!(path = %path, error = %e, "error while watching expectation file");
        }
    };
    FileWatcher::new(path, on_change, on_error)
}

/// The reload pipeline: read the initialization file, parse it, and publish
/// the result to the live matcher. Shared between the watch callback and
/// manual reload calls.
struct Reloader {
    path: Option<String>,
    serializer: ExpectationSerializer,
    matcher: Arc<MockMatcher>,
}

impl Reloader {
    /// Read, parse, publish. Publishing is one full replacement: after
    /// `update` returns, observers see exactly the parsed set (or the empty
    /// set on any read/parse fault).
    fn reload(&self) {
        let expectations = self.retrieve_expectations();
        trace!(
            count = expectations.len(),
            expectations = ?expectations,
            "updating expectations from initialization file"
        );
        self.matcher.update(expectations, Cause::FileWatcher);
    }

    /// The expectations currently defined by the file.
    ///
    /// An unset path, a blank file, a read fault, and a parse fault all
    /// yield the empty list; faults are logged, never propagated. A broken
    /// file therefore visibly clears expectations rather than silently
    /// keeping stale ones.
    fn retrieve_expectations(&self) -> Vec<Expectation> {
        let Some(path) = self.path.as_deref() else {
            return Vec::new();
        };
        match self.read_and_parse(path) {
            Ok(expectations) => expectations,
            Err(e) => {
                warn!(
                    path = %path,
                    error = %e,
                    "failed to load expectation initialization file, treating it as empty"
                );
                Vec::new()
            }
        }
    }

    fn read_and_parse(&self, path: &str) -> Result<Vec<Expectation>, PersistenceError> {
        let json = file_reader::read_to_string(path)?;
        if json.trim().is_empty() {
            // A blank file is not an error, merely "no rules defined".
            return Ok(Vec::new());
        }
        Ok(self.serializer.deserialize_array(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mockd-test-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(path: Option<&str>) -> PersistenceConfig {
        PersistenceConfig {
            watch_initialization_json: true,
            initialization_json_path: path.map(str::to_owned),
        }
    }

    fn ids(matcher: &MockMatcher) -> Vec<String> {
        matcher
            .expectations()
            .into_iter()
            .filter_map(|e| e.id)
            .collect()
    }

    #[test]
    fn disabled_config_creates_no_watch_and_stop_is_a_noop() {
        let matcher = Arc::new(MockMatcher::new());
        matcher.update(
            vec![Expectation {
                id: Some("existing".into()),
                ..Expectation::default()
            }],
            Cause::Api,
        );

        let watcher = ExpectationFileWatcher::new(&PersistenceConfig::default(), matcher.clone());
        assert!(!watcher.is_running());

        watcher.stop();
        watcher.stop();
        watcher.reload();

        // Fully inert: the previous rule set was never touched.
        assert_eq!(ids(&matcher), vec!["existing".to_string()]);
    }

    #[test]
    fn blank_path_reload_always_publishes_the_empty_set() {
        let matcher = Arc::new(MockMatcher::new());
        matcher.update(
            vec![Expectation {
                id: Some("stale".into()),
                ..Expectation::default()
            }],
            Cause::Api,
        );

        let watcher = ExpectationFileWatcher::new(&config(Some("   ")), matcher.clone());
        assert!(!watcher.is_running());

        watcher.reload();
        assert!(matcher.expectations().is_empty());

        watcher.reload();
        assert!(matcher.expectations().is_empty());
    }

    #[test]
    fn reload_fully_replaces_the_previous_set() {
        let dir = scratch_dir("full-replace");
        let path = dir.join("rules.json");
        std::fs::write(&path, r#"[{"id":"A"}]"#).unwrap();

        let matcher = Arc::new(MockMatcher::new());
        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());

        watcher.reload();
        assert_eq!(ids(&matcher), vec!["A".to_string()]);

        std::fs::write(&path, r#"[{"id":"B"},{"id":"C"}]"#).unwrap();
        watcher.reload();
        assert_eq!(ids(&matcher), vec!["B".to_string(), "C".to_string()]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn single_object_document_loads_as_one_expectation() {
        let dir = scratch_dir("single-object");
        let path = dir.join("rules.json");
        std::fs::write(&path, r#"{"id":"only"}"#).unwrap();

        let matcher = Arc::new(MockMatcher::new());
        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        watcher.reload();

        assert_eq!(ids(&matcher), vec!["only".to_string()]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_degrades_to_the_empty_set() {
        let dir = scratch_dir("malformed");
        let path = dir.join("rules.json");
        std::fs::write(&path, r#"[{"id":"A"}]"#).unwrap();

        let matcher = Arc::new(MockMatcher::new());
        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        watcher.reload();
        assert_eq!(ids(&matcher), vec!["A".to_string()]);

        std::fs::write(&path, r#"[{"id":"A""#).unwrap();
        watcher.reload();
        assert!(matcher.expectations().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn blank_file_means_zero_expectations() {
        let dir = scratch_dir("blank-file");
        let path = dir.join("rules.json");
        std::fs::write(&path, "  \n ").unwrap();

        let matcher = Arc::new(MockMatcher::new());
        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        watcher.reload();

        assert!(matcher.expectations().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_degrades_to_the_empty_set() {
        let dir = scratch_dir("missing-file");
        let path = dir.join("rules.json");

        let matcher = Arc::new(MockMatcher::new());
        matcher.update(
            vec![Expectation {
                id: Some("stale".into()),
                ..Expectation::default()
            }],
            Cause::Api,
        );

        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        watcher.reload();

        assert!(matcher.expectations().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reload_faults_do_not_break_later_reloads() {
        let dir = scratch_dir("fault-recovery");
        let path = dir.join("rules.json");
        std::fs::write(&path, "not json at all").unwrap();

        let matcher = Arc::new(MockMatcher::new());
        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        watcher.reload();
        assert!(matcher.expectations().is_empty());

        std::fs::write(&path, r#"[{"id":"recovered"}]"#).unwrap();
        watcher.reload();
        assert_eq!(ids(&matcher), vec!["recovered".to_string()]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_reloads_publish_with_the_file_watcher_cause() {
        let dir = scratch_dir("cause");
        let path = dir.join("rules.json");
        std::fs::write(&path, r#"[{"id":"A"}]"#).unwrap();

        let matcher = Arc::new(MockMatcher::new());
        let causes = Arc::new(std::sync::Mutex::new(Vec::new()));
        let causes_in_listener = causes.clone();
        matcher.add_update_listener(move |_, cause| {
            causes_in_listener.lock().unwrap().push(cause);
        });

        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        watcher.reload();

        assert_eq!(*causes.lock().unwrap(), vec![Cause::FileWatcher]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn watch_setup_failure_keeps_manual_reload_usable() {
        // Parent directory does not exist, so the watch cannot be
        // established.
        let path = std::env::temp_dir()
            .join(format!("mockd-test-no-such-dir-{}", std::process::id()))
            .join("rules.json");

        let matcher = Arc::new(MockMatcher::new());
        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        assert!(!watcher.is_running());

        // Missing file on reload degrades to the empty set.
        watcher.reload();
        assert!(matcher.expectations().is_empty());

        // stop() on a watcher without a handle is still a no-op.
        watcher.stop();
        watcher.stop();
    }

    #[test]
    fn stop_is_idempotent_and_order_independent() {
        let dir = scratch_dir("stop-idempotent");
        let path = dir.join("rules.json");
        std::fs::write(&path, "[]").unwrap();

        let matcher = Arc::new(MockMatcher::new());
        let watcher =
            ExpectationFileWatcher::new(&config(Some(path.to_str().unwrap())), matcher.clone());
        assert!(watcher.is_running());

        watcher.stop();
        assert!(!watcher.is_running());
        watcher.stop();
        watcher.reload();
        watcher.stop();
        assert!(!watcher.is_running());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
