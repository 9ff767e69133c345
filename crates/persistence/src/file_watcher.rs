use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use crate::error::PersistenceError;

/// A live subscription to change notifications for one file path.
///
/// Watches the file's parent directory (non-recursively) and filters events
/// down to the target file name, so editors that replace the file via a
/// rename still produce a notification.
///
/// `on_change` and `on_error` run on the watch backend's own thread.
/// [`set_running(false)`](FileWatcher::set_running) suppresses further
/// callback delivery without tearing the subscription down mid-call; dropping
/// the handle releases the underlying watch.
pub struct FileWatcher {
    // Kept alive for the subscription's lifetime; events stop when dropped.
    _watcher: RecommendedWatcher,
    running: Arc<AtomicBool>,
    path: PathBuf,
}

impl FileWatcher {
    /// Subscribe to content changes of `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        on_change: impl Fn() + Send + 'static,
        on_error: impl Fn(notify::Error) + Send + 'static,
    ) -> Result<Self, PersistenceError> {
        let path: PathBuf = path.into();
        let watch_root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(OsStr::to_os_string);

        let running = Arc::new(AtomicBool::new(true));
        let callback_running = running.clone();
        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                if !callback_running.load(Ordering::SeqCst) {
                    return;
                }
                match result {
                    Ok(event) => {
                        if targets_file(&event, file_name.as_deref())
                            && is_relevant_event(event.kind)
                        {
                            on_change();
                        }
                    }
                    Err(e) => on_error(e),
                }
            },
            notify::Config::default(),
        )?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        debug!(path = %path.display(), "filesystem watch established");

        Ok(Self {
            _watcher: watcher,
            running,
            path,
        })
    }

    /// The watched file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether callbacks are still being delivered.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Enable or disable callback delivery. Idempotent.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }
}

/// Returns `true` for filesystem events that can indicate a content change.
fn is_relevant_event(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Returns `true` when the event concerns the watched file.
///
/// Events without path information are kept, since they may still concern
/// the file.
fn targets_file(event: &Event, file_name: Option<&OsStr>) -> bool {
    let Some(name) = file_name else {
        return true;
    };
    event.paths.is_empty() || event.paths.iter().any(|p| p.file_name() == Some(name))
}
