//! Storage ports
//!
//! How owners and credentials are persisted (key-value store, OS account
//! manager, database) is entirely the adapter's concern.

use async_trait::async_trait;
use authgate_domain::{Credential, CredentialType, Owner, OwnerType};
use thiserror::Error;

/// Errors raised by owner or credential storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// No owner with this name exists.
    #[error("owner not found: {0}")]
    OwnerNotFound(String),

    /// The owner has no credential of this type.
    #[error("no {credential_type} credential stored")]
    CredentialNotFound {
        /// Credential type that was looked up.
        credential_type: CredentialType,
    },

    /// An interactive owner creation flow was canceled.
    #[error("flow canceled")]
    FlowCanceled,

    /// The backing store failed.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Outcome of asking owner storage to create an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerCreation<O> {
    /// The owner was created and can be used immediately.
    Created(O),
    /// Creation needs an interactive flow that was started out-of-band.
    ///
    /// The current request fails with `AuthenticationRequired`; the
    /// surrounding application reacts to the flow it started.
    Pending,
}

/// Port for owner persistence and selection.
#[async_trait]
pub trait OwnerStorage<O: Owner>: Send + Sync {
    /// Creates a new owner, possibly by starting an interactive flow.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FlowCanceled`] if the user aborted the flow.
    async fn create_owner(
        &self,
        owner_type: &OwnerType,
        credential_type: &CredentialType,
    ) -> Result<OwnerCreation<O>, StorageError>;

    /// Looks up an owner by name.
    async fn get_owner(&self, owner_type: &OwnerType, name: &str)
    -> Result<Option<O>, StorageError>;

    /// Returns the currently active owner for this type.
    async fn get_active_owner(&self, owner_type: &OwnerType) -> Result<Option<O>, StorageError>;

    /// Returns every owner of this type.
    async fn get_owners(&self, owner_type: &OwnerType) -> Result<Vec<O>, StorageError>;

    /// Makes `owner` the active owner, or clears the active owner with `None`.
    async fn switch_active_owner(
        &self,
        owner_type: &OwnerType,
        owner: Option<&O>,
    ) -> Result<(), StorageError>;

    /// Removes an owner, returning whether it existed.
    async fn remove_owner(&self, owner_type: &OwnerType, owner: &O) -> Result<bool, StorageError>;
}

/// Port for credential persistence.
///
/// A credential is always scoped to one (owner, credential type) pair.
#[async_trait]
pub trait CredentialStorage<O: Owner>: Send + Sync {
    /// Reads the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CredentialNotFound`] if none is stored.
    async fn get_credentials(
        &self,
        owner: &O,
        credential_type: &CredentialType,
    ) -> Result<Credential, StorageError>;

    /// Removes the stored credential if it still equals `credential`.
    async fn remove_credentials(
        &self,
        owner: &O,
        credential_type: &CredentialType,
        credential: &Credential,
    ) -> Result<(), StorageError>;

    /// Stores (replacing) the credential.
    async fn store_credentials(
        &self,
        owner: &O,
        credential_type: &CredentialType,
        credential: &Credential,
    ) -> Result<(), StorageError>;

    /// Removes every credential stored for `owner`, whatever its type.
    async fn purge_credentials(&self, owner: &O) -> Result<(), StorageError>;
}
