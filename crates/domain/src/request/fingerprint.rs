//! Request identity used for requirement lookup

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RequestSpec;

/// Stable identity of a request shape: method plus full URL.
///
/// Headers and body never participate, so two dispatches of the same
/// endpoint always map to the same requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    /// Computes the fingerprint of a request.
    #[must_use]
    pub fn of(request: &RequestSpec) -> Self {
        Self(format!("{} {}", request.method.as_str(), request.full_url()))
    }

    /// Returns the fingerprint as a string key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_method_and_url_match() {
        let a = RequestSpec::get("https://api.example.com/user");
        let b = RequestSpec::get("https://api.example.com/user");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().as_str(), "GET https://api.example.com/user");
    }

    #[test]
    fn test_headers_and_body_do_not_participate() {
        let a = RequestSpec::post("https://api.example.com/items", "{}")
            .with_header("Accept", "application/json")
            .with_header("X-Trace", "1");
        let b = RequestSpec::post("https://api.example.com/items", r#"{"name":"x"}"#)
            .with_header("X-Trace", "2")
            .with_header("Accept", "text/plain");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_method_and_query_participate() {
        let get = RequestSpec::get("https://api.example.com/items");
        let delete = RequestSpec::new(HttpMethod::Delete, "https://api.example.com/items");
        let paged = RequestSpec::get("https://api.example.com/items").with_query("page", "2");

        assert_ne!(get.fingerprint(), delete.fingerprint());
        assert_ne!(get.fingerprint(), paged.fingerprint());
    }
}
