//! Fingerprint → requirement registry.

use std::collections::HashMap;

use authgate_domain::{RequestFingerprint, Requirement};
use parking_lot::RwLock;

/// Thread-safe map from request fingerprint to authentication requirement.
///
/// First registration wins: a requirement is a static property of the
/// endpoint, so later registrations for the same fingerprint are ignored.
#[derive(Debug, Default)]
pub struct RequirementRegistry {
    entries: RwLock<HashMap<RequestFingerprint, Requirement>>,
}

impl RequirementRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a requirement, returning false if one was already present.
    pub fn register(&self, fingerprint: RequestFingerprint, requirement: Requirement) -> bool {
        if self.entries.read().contains_key(&fingerprint) {
            return false;
        }
        let mut entries = self.entries.write();
        if entries.contains_key(&fingerprint) {
            return false;
        }
        entries.insert(fingerprint, requirement);
        true
    }

    /// Looks up the requirement. `None` means no authentication.
    #[must_use]
    pub fn lookup(&self, fingerprint: &RequestFingerprint) -> Option<Requirement> {
        self.entries.read().get(fingerprint).cloned()
    }

    /// Number of registered fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
