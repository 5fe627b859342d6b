//! HTTP header types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Authorization")
    pub name: String,
    /// The header value
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true if this header has the given name (case-insensitive).
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// An ordered collection of HTTP headers.
///
/// Names compare case-insensitively. Order is preserved for transmission
/// but never affects request identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a header, keeping any existing header with the same name.
    pub fn add(&mut self, header: Header) {
        self.items.push(header);
    }

    /// Replaces every header with this name by a single new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or not a valid HTTP token.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> DomainResult<()> {
        validate_name(name)?;
        self.items.retain(|h| !h.is_named(name));
        self.items.push(Header::new(name, value));
        Ok(())
    }

    /// Removes every header with this name, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|h| !h.is_named(name));
        before - self.items.len()
    }

    /// Returns the first value for this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.is_named(name))
            .map(|h| h.value.as_str())
    }

    /// Returns an iterator over all headers.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidHeaderName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.add(Header::new("authorization", "Bearer old"));
        headers.add(Header::new("Accept", "application/json"));

        headers.set("Authorization", "Bearer new").unwrap_or_default();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer new"));
    }

    #[test]
    fn test_set_rejects_invalid_name() {
        let mut headers = Headers::new();
        assert!(headers.set("bad header", "x").is_err());
        assert!(headers.set("", "x").is_err());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut headers: Headers = [Header::new("X-A", "1"), Header::new("x-a", "2")]
            .into_iter()
            .collect();
        assert_eq!(headers.remove("X-a"), 2);
        assert!(headers.is_empty());
    }
}
