use serde::{Deserialize, Serialize};

use crate::request::RequestDefinition;
use crate::response::ResponseDefinition;

/// One request-matching rule: a request shape paired with the response to
/// return for it.
///
/// Every field is optional on the wire so partially specified documents
/// (for example `{"id":"A"}`) still deserialize; unmatched fields behave as
/// wildcards during matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectation {
    /// Stable identifier, used for bookkeeping and log output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Matching priority; higher values are consulted first.
    #[serde(default)]
    pub priority: i64,

    /// Request shape this expectation matches. Absent means "match any
    /// request".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_request: Option<RequestDefinition>,

    /// Response returned on a match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_response: Option<ResponseDefinition>,
}

impl Expectation {
    /// True when this expectation's request definition matches `request`.
    pub fn matches(&self, request: &RequestDefinition) -> bool {
        match &self.http_request {
            Some(definition) => definition.matches(request),
            None => true,
        }
    }
}
