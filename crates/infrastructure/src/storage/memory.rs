//! In-memory owner and credential storage.
//!
//! Owners are addressed by their `Display` form, which doubles as the
//! owner's name for [`OwnerStorage::get_owner`] and as the credential key.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use authgate_application::ports::{CredentialStorage, OwnerCreation, OwnerStorage, StorageError};
use authgate_domain::{Credential, CredentialType, Owner, OwnerType};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Hook that creates owners on demand, e.g. by starting a login flow.
#[async_trait]
pub trait OwnerFactory<O: Owner>: Send + Sync {
    /// Creates an owner of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FlowCanceled`] if the user aborted.
    async fn create(
        &self,
        owner_type: &OwnerType,
        credential_type: &CredentialType,
    ) -> Result<OwnerCreation<O>, StorageError>;
}

/// Owner storage backed by in-process maps.
///
/// Without a factory, creating an owner reports [`OwnerCreation::Pending`].
pub struct InMemoryOwnerStorage<O: Owner> {
    owners: RwLock<HashMap<OwnerType, Vec<O>>>,
    active: RwLock<HashMap<OwnerType, O>>,
    factory: Option<Arc<dyn OwnerFactory<O>>>,
}

impl<O: Owner> Default for InMemoryOwnerStorage<O> {
    fn default() -> Self {
        Self {
            owners: RwLock::new(HashMap::new()),
            active: RwLock::new(HashMap::new()),
            factory: None,
        }
    }
}

impl<O: Owner + Display> InMemoryOwnerStorage<O> {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook used by `create_owner`.
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn OwnerFactory<O>>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Adds an owner. Owners with the same name are replaced.
    pub async fn add_owner(&self, owner_type: &OwnerType, owner: O) {
        let mut owners = self.owners.write().await;
        let list = owners.entry(owner_type.clone()).or_default();
        let name = owner.to_string();
        list.retain(|o| o.to_string() != name);
        list.push(owner);
    }
}

#[async_trait]
impl<O: Owner + Display> OwnerStorage<O> for InMemoryOwnerStorage<O> {
    #[instrument(skip(self))]
    async fn create_owner(
        &self,
        owner_type: &OwnerType,
        credential_type: &CredentialType,
    ) -> Result<OwnerCreation<O>, StorageError> {
        let Some(factory) = &self.factory else {
            debug!("no owner factory configured");
            return Ok(OwnerCreation::Pending);
        };
        let creation = factory.create(owner_type, credential_type).await?;
        if let OwnerCreation::Created(owner) = &creation {
            self.add_owner(owner_type, owner.clone()).await;
        }
        Ok(creation)
    }

    async fn get_owner(
        &self,
        owner_type: &OwnerType,
        name: &str,
    ) -> Result<Option<O>, StorageError> {
        Ok(self
            .owners
            .read()
            .await
            .get(owner_type)
            .and_then(|list| list.iter().find(|o| o.to_string() == name).cloned()))
    }

    async fn get_active_owner(&self, owner_type: &OwnerType) -> Result<Option<O>, StorageError> {
        Ok(self.active.read().await.get(owner_type).cloned())
    }

    async fn get_owners(&self, owner_type: &OwnerType) -> Result<Vec<O>, StorageError> {
        Ok(self
            .owners
            .read()
            .await
            .get(owner_type)
            .cloned()
            .unwrap_or_default())
    }

    async fn switch_active_owner(
        &self,
        owner_type: &OwnerType,
        owner: Option<&O>,
    ) -> Result<(), StorageError> {
        let mut active = self.active.write().await;
        match owner {
            Some(owner) => {
                let known = self
                    .owners
                    .read()
                    .await
                    .get(owner_type)
                    .is_some_and(|list| list.contains(owner));
                if !known {
                    return Err(StorageError::OwnerNotFound(owner.to_string()));
                }
                active.insert(owner_type.clone(), owner.clone());
            }
            None => {
                active.remove(owner_type);
            }
        }
        Ok(())
    }

    async fn remove_owner(&self, owner_type: &OwnerType, owner: &O) -> Result<bool, StorageError> {
        let mut owners = self.owners.write().await;
        let Some(list) = owners.get_mut(owner_type) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|o| o != owner);
        Ok(list.len() != before)
    }
}

/// Credential storage backed by an in-process map.
pub struct InMemoryCredentialStorage<O: Owner> {
    entries: RwLock<HashMap<(String, CredentialType), Credential>>,
    _owner: std::marker::PhantomData<fn() -> O>,
}

impl<O: Owner> Default for InMemoryCredentialStorage<O> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            _owner: std::marker::PhantomData,
        }
    }
}

impl<O: Owner + Display> InMemoryCredentialStorage<O> {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(owner: &O, credential_type: &CredentialType) -> (String, CredentialType) {
        (owner.to_string(), credential_type.clone())
    }
}

#[async_trait]
impl<O: Owner + Display> CredentialStorage<O> for InMemoryCredentialStorage<O> {
    async fn get_credentials(
        &self,
        owner: &O,
        credential_type: &CredentialType,
    ) -> Result<Credential, StorageError> {
        self.entries
            .read()
            .await
            .get(&Self::key(owner, credential_type))
            .cloned()
            .ok_or_else(|| StorageError::CredentialNotFound {
                credential_type: credential_type.clone(),
            })
    }

    async fn remove_credentials(
        &self,
        owner: &O,
        credential_type: &CredentialType,
        credential: &Credential,
    ) -> Result<(), StorageError> {
        let key = Self::key(owner, credential_type);
        let mut entries = self.entries.write().await;
        if entries.get(&key) == Some(credential) {
            entries.remove(&key);
        }
        Ok(())
    }

    async fn store_credentials(
        &self,
        owner: &O,
        credential_type: &CredentialType,
        credential: &Credential,
    ) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(Self::key(owner, credential_type), credential.clone());
        Ok(())
    }

    async fn purge_credentials(&self, owner: &O) -> Result<(), StorageError> {
        let name = owner.to_string();
        self.entries.write().await.retain(|(key, _), _| *key != name);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Signup(Result<OwnerCreation<String>, StorageError>);

    #[async_trait]
    impl OwnerFactory<String> for Signup {
        async fn create(
            &self,
            _owner_type: &OwnerType,
            _credential_type: &CredentialType,
        ) -> Result<OwnerCreation<String>, StorageError> {
            self.0.clone()
        }
    }

    fn account() -> OwnerType {
        OwnerType::new("account")
    }

    #[tokio::test]
    async fn test_owners_by_name_and_active() {
        let storage = InMemoryOwnerStorage::<String>::new();
        storage.add_owner(&account(), "alice".to_string()).await;
        storage.add_owner(&account(), "bob".to_string()).await;

        assert_eq!(
            storage.get_owner(&account(), "bob").await.unwrap(),
            Some("bob".to_string())
        );
        assert_eq!(storage.get_active_owner(&account()).await.unwrap(), None);

        storage
            .switch_active_owner(&account(), Some(&"bob".to_string()))
            .await
            .unwrap();
        assert_eq!(
            storage.get_active_owner(&account()).await.unwrap(),
            Some("bob".to_string())
        );
    }

    #[tokio::test]
    async fn test_switching_to_unknown_owner_fails() {
        let storage = InMemoryOwnerStorage::<String>::new();

        let result = storage
            .switch_active_owner(&account(), Some(&"mallory".to_string()))
            .await;

        assert_eq!(result, Err(StorageError::OwnerNotFound("mallory".to_string())));
    }

    #[tokio::test]
    async fn test_creation_without_factory_is_pending() {
        let storage = InMemoryOwnerStorage::<String>::new();

        let creation = storage
            .create_owner(&account(), &CredentialType::new("bearer"))
            .await
            .unwrap();

        assert_eq!(creation, OwnerCreation::Pending);
    }

    #[tokio::test]
    async fn test_factory_created_owner_is_stored() {
        let storage = InMemoryOwnerStorage::<String>::new().with_factory(Arc::new(Signup(Ok(
            OwnerCreation::Created("carol".to_string()),
        ))));

        storage
            .create_owner(&account(), &CredentialType::new("bearer"))
            .await
            .unwrap();

        assert_eq!(
            storage.get_owners(&account()).await.unwrap(),
            vec!["carol".to_string()]
        );
    }

    #[tokio::test]
    async fn test_factory_cancellation_propagates() {
        let storage = InMemoryOwnerStorage::<String>::new()
            .with_factory(Arc::new(Signup(Err(StorageError::FlowCanceled))));

        let result = storage
            .create_owner(&account(), &CredentialType::new("bearer"))
            .await;

        assert_eq!(result, Err(StorageError::FlowCanceled));
    }

    #[tokio::test]
    async fn test_remove_credentials_only_if_unchanged() {
        let storage = InMemoryCredentialStorage::<String>::new();
        let owner = "alice".to_string();
        let bearer = CredentialType::new("bearer");
        storage
            .store_credentials(&owner, &bearer, &Credential::new("new"))
            .await
            .unwrap();

        storage
            .remove_credentials(&owner, &bearer, &Credential::new("old"))
            .await
            .unwrap();
        assert_eq!(
            storage.get_credentials(&owner, &bearer).await.unwrap().token,
            "new"
        );

        storage
            .remove_credentials(&owner, &bearer, &Credential::new("new"))
            .await
            .unwrap();
        assert!(matches!(
            storage.get_credentials(&owner, &bearer).await,
            Err(StorageError::CredentialNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_purge_drops_only_that_owner() {
        let storage = InMemoryCredentialStorage::<String>::new();
        let alice = "alice".to_string();
        let bob = "bob".to_string();
        let bearer = CredentialType::new("bearer");
        let api_key = CredentialType::new("api-key");
        for (owner, credential_type) in [(&alice, &bearer), (&alice, &api_key), (&bob, &bearer)] {
            storage
                .store_credentials(owner, credential_type, &Credential::new("token"))
                .await
                .unwrap();
        }

        storage.purge_credentials(&alice).await.unwrap();

        assert!(storage.get_credentials(&alice, &bearer).await.is_err());
        assert!(storage.get_credentials(&alice, &api_key).await.is_err());
        assert!(storage.get_credentials(&bob, &bearer).await.is_ok());
    }
}
