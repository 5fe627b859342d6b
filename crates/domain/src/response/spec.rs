//! Response specification type

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::{Header, Headers};

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: Vec<u8>,
    /// Time from dispatch to fully read body
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(
        status: u16,
        headers: impl IntoIterator<Item = (String, String)>,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(name, value)| Header::new(name, value))
                .collect(),
            body,
            duration,
        }
    }

    /// Creates an empty-bodied response with the given status.
    #[must_use]
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 401 Unauthorized.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Response size in bytes.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn size(&self) -> usize {
        self.body.len()
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            status: 0,
            headers: Headers::new(),
            body: Vec::new(),
            duration: Duration::ZERO,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_checks() {
        assert!(ResponseSpec::with_status(200).is_success());
        assert!(!ResponseSpec::with_status(401).is_success());
        assert!(ResponseSpec::with_status(401).is_unauthorized());
        assert!(!ResponseSpec::with_status(403).is_unauthorized());
    }

    #[test]
    fn test_new_collects_headers() {
        let response = ResponseSpec::new(
            200,
            vec![("Content-Type".to_string(), "text/plain".to_string())],
            b"hello".to_vec(),
            Duration::from_millis(5),
        );
        assert_eq!(response.headers.get("content-type"), Some("text/plain"));
        assert_eq!(response.size(), 5);
        assert_eq!(response.text(), "hello");
    }
}
