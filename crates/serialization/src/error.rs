use thiserror::Error;

/// Errors from expectation JSON (de)serialization.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The document was not valid JSON, or did not have the expected
    /// single-object-or-array shape.
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// An expectation could not be rendered back to JSON.
    #[error("JSON serialize error: {0}")]
    Serialize(String),
}
