//! In-memory doubles shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use authgate_domain::{
    AuthMetadata, Credential, CredentialType, DomainResult, OwnerType, RequestSpec, ResponseSpec,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::ports::{
    AuthenticationPolicy, BoxError, Clock, CredentialStorage, HttpClient, HttpClientError,
    OwnerCreation, OwnerStorage, StorageError,
};

pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Owner storage over plain names.
pub struct TestOwners {
    owners: Mutex<Vec<String>>,
    active: Mutex<Option<String>>,
    creation: Result<OwnerCreation<String>, StorageError>,
    creations: AtomicUsize,
    lookups: AtomicUsize,
}

impl TestOwners {
    pub fn with(owners: &[&str], active: Option<&str>) -> Self {
        Self {
            owners: Mutex::new(owners.iter().map(ToString::to_string).collect()),
            active: Mutex::new(active.map(ToString::to_string)),
            creation: Ok(OwnerCreation::Pending),
            creations: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn creating(creation: OwnerCreation<String>) -> Self {
        Self {
            creation: Ok(creation),
            ..Self::with(&[], None)
        }
    }

    pub fn canceling() -> Self {
        Self {
            creation: Err(StorageError::FlowCanceled),
            ..Self::with(&[], None)
        }
    }

    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> Option<String> {
        self.active.lock().clone()
    }
}

#[async_trait]
impl OwnerStorage<String> for TestOwners {
    async fn create_owner(
        &self,
        _owner_type: &OwnerType,
        _credential_type: &CredentialType,
    ) -> Result<OwnerCreation<String>, StorageError> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        let creation = self.creation.clone()?;
        if let OwnerCreation::Created(owner) = &creation {
            self.owners.lock().push(owner.clone());
        }
        Ok(creation)
    }

    async fn get_owner(
        &self,
        _owner_type: &OwnerType,
        name: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self.owners.lock().iter().find(|o| *o == name).cloned())
    }

    async fn get_active_owner(&self, _owner_type: &OwnerType) -> Result<Option<String>, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.active())
    }

    async fn get_owners(&self, _owner_type: &OwnerType) -> Result<Vec<String>, StorageError> {
        Ok(self.owners.lock().clone())
    }

    async fn switch_active_owner(
        &self,
        _owner_type: &OwnerType,
        owner: Option<&String>,
    ) -> Result<(), StorageError> {
        *self.active.lock() = owner.cloned();
        Ok(())
    }

    async fn remove_owner(&self, _owner_type: &OwnerType, owner: &String) -> Result<bool, StorageError> {
        let mut owners = self.owners.lock();
        let before = owners.len();
        owners.retain(|o| o != owner);
        Ok(owners.len() != before)
    }
}

/// Credential storage keyed by `(owner, credential type)`.
pub struct TestCredentials {
    entries: Mutex<HashMap<(String, String), Credential>>,
    stored: Mutex<Vec<String>>,
}

impl TestCredentials {
    pub fn empty() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stored: Mutex::new(Vec::new()),
        }
    }

    pub fn holding(owner: &str, credential_type: &str, token: &str) -> Self {
        let store = Self::empty();
        store.put(owner, credential_type, Credential::new(token));
        store
    }

    pub fn put(&self, owner: &str, credential_type: &str, credential: Credential) {
        self.entries
            .lock()
            .insert((owner.to_string(), credential_type.to_string()), credential);
    }

    pub fn token(&self, owner: &str, credential_type: &str) -> Option<String> {
        self.entries
            .lock()
            .get(&(owner.to_string(), credential_type.to_string()))
            .map(|c| c.token.clone())
    }

    /// Tokens passed to `store_credentials`, in call order.
    pub fn stored_tokens(&self) -> Vec<String> {
        self.stored.lock().clone()
    }

    fn key(owner: &str, credential_type: &CredentialType) -> (String, String) {
        (owner.to_string(), credential_type.as_str().to_string())
    }
}

#[async_trait]
impl CredentialStorage<String> for TestCredentials {
    async fn get_credentials(
        &self,
        owner: &String,
        credential_type: &CredentialType,
    ) -> Result<Credential, StorageError> {
        self.entries
            .lock()
            .get(&Self::key(owner, credential_type))
            .cloned()
            .ok_or_else(|| StorageError::CredentialNotFound {
                credential_type: credential_type.clone(),
            })
    }

    async fn remove_credentials(
        &self,
        owner: &String,
        credential_type: &CredentialType,
        credential: &Credential,
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let key = Self::key(owner, credential_type);
        if entries.get(&key) == Some(credential) {
            entries.remove(&key);
        }
        Ok(())
    }

    async fn store_credentials(
        &self,
        owner: &String,
        credential_type: &CredentialType,
        credential: &Credential,
    ) -> Result<(), StorageError> {
        self.stored.lock().push(credential.token.clone());
        self.entries
            .lock()
            .insert(Self::key(owner, credential_type), credential.clone());
        Ok(())
    }

    async fn purge_credentials(&self, owner: &String) -> Result<(), StorageError> {
        self.entries.lock().retain(|(name, _), _| name != owner);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub enum RefreshOutcome {
    /// Hands the stale credential back unchanged.
    #[default]
    Echo,
    Token(String),
    Nothing,
    Fail,
}

#[derive(Debug, Default)]
pub struct Counters {
    refreshes: AtomicUsize,
    authentications: AtomicUsize,
}

/// Bearer-header policy with scripted refresh behavior.
///
/// Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    pub cancel_choice: bool,
    pub refresh: RefreshOutcome,
    pub invalid: Option<String>,
    pub greedy: bool,
    pub refresh_delay: Option<Duration>,
    pub counters: Arc<Counters>,
}

impl StaticPolicy {
    pub fn refreshing_to(token: &str) -> Self {
        Self {
            refresh: RefreshOutcome::Token(token.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_refresh() -> Self {
        Self {
            refresh: RefreshOutcome::Fail,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn invalid_token(mut self, token: &str) -> Self {
        self.invalid = Some(token.to_string());
        self
    }

    #[must_use]
    pub fn issuing_nothing(mut self) -> Self {
        self.refresh = RefreshOutcome::Nothing;
        self
    }

    /// Asks for a refresh on every 401, whatever the attempt count.
    #[must_use]
    pub const fn always_refresh(mut self) -> Self {
        self.greedy = true;
        self
    }

    pub fn refreshes(&self) -> usize {
        self.counters.refreshes.load(Ordering::SeqCst)
    }

    pub fn authentications(&self) -> usize {
        self.counters.authentications.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthenticationPolicy<String> for StaticPolicy {
    fn owner_type(&self, meta: &AuthMetadata) -> OwnerType {
        OwnerType::new(meta.scheme.clone())
    }

    fn credential_type(&self, _meta: &AuthMetadata) -> CredentialType {
        CredentialType::new("bearer")
    }

    fn authenticate_request(
        &self,
        mut request: RequestSpec,
        credential: &Credential,
    ) -> DomainResult<RequestSpec> {
        self.counters.authentications.fetch_add(1, Ordering::SeqCst);
        request.set_header("Authorization", format!("Bearer {}", credential.token))?;
        Ok(request)
    }

    fn is_credential_valid(&self, credential: &Credential) -> bool {
        self.invalid.as_deref() != Some(credential.token.as_str())
    }

    async fn refresh_credentials(
        &self,
        _owner: &String,
        _credential_type: &CredentialType,
        credential: Credential,
    ) -> Result<Option<Credential>, BoxError> {
        self.counters.refreshes.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.refresh_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.refresh {
            RefreshOutcome::Echo => Ok(Some(credential)),
            RefreshOutcome::Token(token) => Ok(Some(Credential::new(token.clone()))),
            RefreshOutcome::Nothing => Ok(None),
            RefreshOutcome::Fail => Err("token endpoint unavailable".into()),
        }
    }

    fn refresh_required(&self, try_count: u32, response: &ResponseSpec) -> bool {
        response.is_unauthorized() && (self.greedy || try_count <= 1)
    }

    async fn choose_owner(&self, owners: &[String]) -> Option<String> {
        if self.cancel_choice {
            None
        } else {
            owners.first().cloned()
        }
    }
}

/// HTTP client answering with a fixed sequence of statuses, then 200.
#[derive(Default)]
pub struct ScriptedHttp {
    statuses: Mutex<Vec<u16>>,
    failure: Mutex<Option<HttpClientError>>,
    sent: Mutex<Vec<RequestSpec>>,
}

impl ScriptedHttp {
    pub fn new(statuses: &[u16]) -> Self {
        let mut statuses = statuses.to_vec();
        statuses.reverse();
        Self {
            statuses: Mutex::new(statuses),
            ..Self::default()
        }
    }

    pub fn fail_with(&self, error: HttpClientError) {
        *self.failure.lock() = Some(error);
    }

    pub fn sent(&self) -> Vec<RequestSpec> {
        self.sent.lock().clone()
    }
}

impl HttpClient for ScriptedHttp {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        self.sent.lock().push(request.clone());
        let status = self.statuses.lock().pop().unwrap_or(200);
        Ok(ResponseSpec::with_status(status))
    }
}
