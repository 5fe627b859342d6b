//! Owner resolution.

use std::sync::Arc;

use authgate_domain::{CredentialType, Owner, OwnerType};
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};
use crate::ports::{AuthenticationPolicy, OwnerCreation, OwnerStorage};

/// Determines which owner a request's credential belongs to.
///
/// Priority: the active owner; otherwise one chosen by the policy from the
/// existing owners; otherwise a newly created one. A chosen or created
/// owner becomes the active owner.
pub struct OwnerResolver<O: Owner> {
    storage: Arc<dyn OwnerStorage<O>>,
    policy: Arc<dyn AuthenticationPolicy<O>>,
}

impl<O: Owner> OwnerResolver<O> {
    /// Creates a resolver over the given storage and policy.
    pub fn new(storage: Arc<dyn OwnerStorage<O>>, policy: Arc<dyn AuthenticationPolicy<O>>) -> Self {
        Self { storage, policy }
    }

    /// Resolves the owner for `owner_type`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::FlowCanceled`] if choosing or creating was canceled.
    /// - [`AuthError::AuthenticationRequired`] if creation continues out-of-band.
    /// - [`AuthError::Storage`] if owner storage fails.
    pub async fn resolve(
        &self,
        owner_type: &OwnerType,
        credential_type: &CredentialType,
    ) -> AuthResult<O> {
        if let Some(active) = self.storage.get_active_owner(owner_type).await? {
            return Ok(active);
        }

        let owners = self.storage.get_owners(owner_type).await?;
        let owner = if owners.is_empty() {
            match self.storage.create_owner(owner_type, credential_type).await? {
                OwnerCreation::Created(owner) => {
                    info!(%owner_type, ?owner, "created owner");
                    owner
                }
                OwnerCreation::Pending => {
                    info!(%owner_type, "owner creation started out-of-band");
                    return Err(AuthError::AuthenticationRequired {
                        owner_type: owner_type.clone(),
                    });
                }
            }
        } else {
            debug!(%owner_type, count = owners.len(), "no active owner, asking policy to choose");
            self.policy
                .choose_owner(&owners)
                .await
                .ok_or(AuthError::FlowCanceled)?
        };

        self.storage
            .switch_active_owner(owner_type, Some(&owner))
            .await?;
        info!(%owner_type, ?owner, "adopted active owner");
        Ok(owner)
    }

    /// Makes `owner` the active owner for its type.
    ///
    /// # Errors
    ///
    /// Returns an error if owner storage fails.
    pub async fn switch_owner(&self, owner_type: &OwnerType, owner: &O) -> AuthResult<()> {
        self.storage
            .switch_active_owner(owner_type, Some(owner))
            .await?;
        Ok(())
    }

    /// Removes an owner, clearing the active owner if it was this one.
    ///
    /// Returns whether the owner existed.
    ///
    /// # Errors
    ///
    /// Returns an error if owner storage fails.
    pub async fn logout(&self, owner_type: &OwnerType, owner: &O) -> AuthResult<bool> {
        let was_active = self
            .storage
            .get_active_owner(owner_type)
            .await?
            .is_some_and(|active| active == *owner);
        let removed = self.storage.remove_owner(owner_type, owner).await?;
        if was_active {
            self.storage.switch_active_owner(owner_type, None).await?;
        }
        info!(%owner_type, ?owner, removed, "logged out owner");
        Ok(removed)
    }
}
