use serde::Deserialize;

use mockd_core::Expectation;

use crate::error::SerializationError;

/// Accepts either a single expectation object or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Expectation>),
    One(Expectation),
}

/// Parses expectation definition documents.
///
/// A document is either one JSON expectation object or a JSON array of
/// expectation objects; both shapes deserialize to an ordered `Vec` that
/// preserves document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectationSerializer;

impl ExpectationSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Parse `json` into an ordered list of expectations.
    pub fn deserialize_array(&self, json: &str) -> Result<Vec<Expectation>, SerializationError> {
        match serde_json::from_str::<OneOrMany>(json)
            .map_err(|e| SerializationError::Parse(e.to_string()))?
        {
            OneOrMany::Many(expectations) => Ok(expectations),
            OneOrMany::One(expectation) => Ok(vec![expectation]),
        }
    }

    /// Render expectations back to a JSON array.
    pub fn serialize(&self, expectations: &[Expectation]) -> Result<String, SerializationError> {
        serde_json::to_string(expectations).map_err(|e| SerializationError::Serialize(e.to_string()))
    }
}
