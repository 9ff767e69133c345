use std::sync::{PoisonError, RwLock};

use tracing::debug;

use mockd_core::{Cause, Expectation, RequestDefinition};

/// Callback invoked after the expectation set has been replaced.
///
/// Receives the new set and the cause of the replacement. Listeners run on
/// the updating thread, after the new set is visible to readers.
pub type UpdateListener = Box<dyn Fn(&[Expectation], Cause) + Send + Sync>;

/// The live matching engine: holds the ordered expectation set currently in
/// effect and answers first-match lookups against it.
///
/// [`update`](MockMatcher::update) is the single replacement entry point for
/// every source of expectations (file watcher, initializer, API). The whole
/// set is swapped under one write lock, so readers observe either the
/// previous complete set or the new complete set, never a partial mix.
#[derive(Default)]
pub struct MockMatcher {
    expectations: RwLock<Vec<Expectation>>,
    listeners: RwLock<Vec<UpdateListener>>,
}

impl MockMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full expectation set, re-sorting by descending priority
    /// (stable, so file order breaks ties), then notify listeners with the
    /// given cause.
    pub fn update(&self, mut expectations: Vec<Expectation>, cause: Cause) {
        expectations.sort_by(|a, b| b.priority.cmp(&a.priority));
        debug!(
            count = expectations.len(),
            cause = %cause,
            "replacing expectation set"
        );

        {
            let mut live = self
                .expectations
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *live = expectations;
        }

        let live = self
            .expectations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(&live, cause);
        }
    }

    /// Register a listener for expectation set replacements.
    pub fn add_update_listener(
        &self,
        listener: impl Fn(&[Expectation], Cause) + Send + Sync + 'static,
    ) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    /// First expectation (in priority order) whose request definition
    /// matches `request`.
    pub fn first_matching_expectation(
        &self,
        request: &RequestDefinition,
    ) -> Option<Expectation> {
        self.expectations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| e.matches(request))
            .cloned()
    }

    /// Snapshot of the current expectation set.
    pub fn expectations(&self) -> Vec<Expectation> {
        self.expectations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
