use serde::{Deserialize, Serialize};

/// The request shape an expectation matches against.
///
/// Every field is optional; an absent field matches any value. Incoming
/// requests are represented with the same type, with their observed values
/// filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefinition {
    /// HTTP method, matched case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Request path, matched exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl RequestDefinition {
    /// True when every field present on `self` agrees with `request`.
    ///
    /// Fields left unset on the definition act as wildcards.
    pub fn matches(&self, request: &RequestDefinition) -> bool {
        if let Some(method) = &self.method {
            let matched = request
                .method
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case(method));
            if !matched {
                return false;
            }
        }
        if let Some(path) = &self.path {
            if request.path.as_deref() != Some(path.as_str()) {
                return false;
            }
        }
        true
    }
}
