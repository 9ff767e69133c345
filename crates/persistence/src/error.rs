use thiserror::Error;

/// Errors from file-backed expectation persistence.
///
/// These never escape to callers of the watcher entry points; the reload
/// pipeline recovers from each of them locally (logging and degrading to an
/// empty expectation set).
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The initialization file could not be read.
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    /// The initialization file did not parse as expectation JSON.
    #[error("parse error: {0}")]
    Parse(#[from] mockd_serialization::SerializationError),

    /// The filesystem watch could not be established.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}
