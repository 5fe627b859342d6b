//! Owner, credential type and requirement types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A principal credentials are associated with (e.g. a logged-in account).
///
/// The interceptor never creates owners itself; they come from owner storage.
/// Any cloneable, equality-comparable, thread-safe type qualifies.
pub trait Owner: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> Owner for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// Classifies what kind of owner a request requires (e.g. `"github-account"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerType(String);

impl OwnerType {
    /// Creates a new owner type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the owner type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Classifies what kind of credential a request needs (e.g. `"bearer-token"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialType(String);

impl CredentialType {
    /// Creates a new credential type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the credential type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CredentialType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The authentication requirement of an endpoint.
///
/// Attached once to a request fingerprint and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    /// Kind of owner the credential must belong to.
    pub owner_type: OwnerType,
    /// Kind of credential to attach.
    pub credential_type: CredentialType,
}

impl Requirement {
    /// Creates a requirement from its two classification tags.
    #[must_use]
    pub fn new(owner_type: impl Into<OwnerType>, credential_type: impl Into<CredentialType>) -> Self {
        Self {
            owner_type: owner_type.into(),
            credential_type: credential_type.into(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_type, self.credential_type)
    }
}

/// Per-endpoint authentication annotation carried by a request.
///
/// The authentication policy maps it to an [`OwnerType`] and a
/// [`CredentialType`]; the interceptor never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMetadata {
    /// Scheme name declared by the endpoint (e.g. `"github"`).
    pub scheme: String,
    /// Free-form attributes (scopes, audiences, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl AuthMetadata {
    /// Creates metadata for the given scheme without attributes.
    #[must_use]
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
