//! Application error types

use std::sync::Arc;

use authgate_domain::{CredentialType, DomainError, OwnerType};
use thiserror::Error;

use crate::ports::{HttpClientError, StorageError};

/// Error type shared by every request queued behind one failing refresh.
///
/// All waiters receive clones of the same `Arc`, so they observe one
/// failure rather than independent copies.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the credential interceptor.
///
/// None of these are retried by the interceptor. The only local recovery
/// is the stale credential → refresh → retry path, which never produces
/// an error on success.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The user or operator aborted an interactive owner choice or creation.
    #[error("authentication flow canceled")]
    FlowCanceled,

    /// No owner could be resolved synchronously; creation runs out-of-band.
    #[error("authentication required for owner type {owner_type}")]
    AuthenticationRequired {
        /// Owner type that has no usable owner.
        owner_type: OwnerType,
    },

    /// The refresh callback failed.
    #[error("credential refresh failed: {0}")]
    RefreshFailed(#[source] SharedError),

    /// The owner has no credential of the required type.
    #[error("no {credential_type} credential available")]
    CredentialMissing {
        /// Credential type that was looked up.
        credential_type: CredentialType,
    },

    /// Owner or credential storage failed.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// The request could not be decorated.
    #[error("invalid request: {0}")]
    Request(#[from] DomainError),

    /// Transport failure, passed through untouched.
    #[error(transparent)]
    Transport(#[from] HttpClientError),
}

impl AuthError {
    /// Wraps a refresh callback failure.
    #[must_use]
    pub fn refresh_failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::RefreshFailed(Arc::from(source.into()))
    }

    /// Returns true if the user has to (re-)authenticate before retrying.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::FlowCanceled | Self::AuthenticationRequired { .. } | Self::CredentialMissing { .. }
        )
    }

    /// Returns true for transport failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The refresh failure shared between waiters, if this is one.
    #[must_use]
    pub const fn refresh_source(&self) -> Option<&SharedError> {
        match self {
            Self::RefreshFailed(source) => Some(source),
            _ => None,
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::FlowCanceled => Self::FlowCanceled,
            StorageError::CredentialNotFound { credential_type } => {
                Self::CredentialMissing { credential_type }
            }
            other => Self::Storage(other),
        }
    }
}

/// Result type alias for interceptor operations.
pub type AuthResult<T> = Result<T, AuthError>;
