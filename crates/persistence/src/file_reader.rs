use std::path::Path;

use crate::error::PersistenceError;

/// Read the full contents of the expectation definitions file as text.
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String, PersistenceError> {
    Ok(std::fs::read_to_string(path)?)
}
