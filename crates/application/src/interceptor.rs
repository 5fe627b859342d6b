//! Credential interceptor
//!
//! The pipeline stage that resolves, attaches and refreshes credentials for
//! every outgoing request. Per request:
//!
//! 1. Compute the fingerprint and look up its requirement; without one the
//!    request passes through untouched.
//! 2. Resolve owner and credential inside the refresh coordinator.
//! 3. Decorate the request through the policy and execute it.
//! 4. Ask the policy whether the response demands a refresh; if so, retry
//!    with the rejected credential marked for refresh.

use std::sync::Arc;

use authgate_domain::{
    AuthSettings, Credential, HttpMethod, Owner, OwnerType, RequestFingerprint, RequestSpec,
    Requirement, ResponseSpec,
};
use tracing::{Span, debug, instrument, warn};

use crate::auth::{CredentialResolver, OwnerResolver, RefreshCoordinator, RequirementRegistry};
use crate::error::AuthResult;
use crate::ports::{AuthenticationPolicy, Clock, CredentialStorage, HttpClient, OwnerStorage};

/// Attaches credentials to requests and refreshes them on rejection.
///
/// # Example
///
/// ```ignore
/// let interceptor = AuthInterceptor::builder()
///     .owner_storage(owners)
///     .credential_storage(credentials)
///     .policy(Arc::new(GithubPolicy))
///     .http_client(Arc::new(ReqwestHttpClient::new(&settings)?))
///     .clock(Arc::new(SystemClock::new()))
///     .build()?;
///
/// let request = RequestSpec::get("https://api.github.com/user")
///     .with_auth(AuthMetadata::new("github"));
/// let response = interceptor.execute(&request).await?;
/// ```
pub struct AuthInterceptor<O: Owner, C: HttpClient> {
    client: Arc<C>,
    policy: Arc<dyn AuthenticationPolicy<O>>,
    registry: Arc<RequirementRegistry>,
    coordinator: Arc<RefreshCoordinator>,
    owners: OwnerResolver<O>,
    credentials: CredentialResolver<O>,
    settings: AuthSettings,
}

impl<O: Owner, C: HttpClient> AuthInterceptor<O, C> {
    /// Starts building an interceptor.
    #[must_use]
    pub fn builder() -> AuthInterceptorBuilder<O, C> {
        AuthInterceptorBuilder::default()
    }

    /// Declares the requirement of an endpoint without dispatching to it.
    ///
    /// Returns false if the endpoint already had a requirement.
    pub fn declare(&self, method: HttpMethod, url: &str, requirement: Requirement) -> bool {
        let fingerprint = RequestSpec::new(method, url).fingerprint();
        self.registry.register(fingerprint, requirement)
    }

    /// Returns the requirement for this request, registering it from the
    /// request's annotation the first time its fingerprint is seen.
    #[must_use]
    pub fn requirement_for(&self, request: &RequestSpec) -> Option<Requirement> {
        self.requirement_at(request, &request.fingerprint())
    }

    fn requirement_at(
        &self,
        request: &RequestSpec,
        fingerprint: &RequestFingerprint,
    ) -> Option<Requirement> {
        if let Some(requirement) = self.registry.lookup(fingerprint) {
            return Some(requirement);
        }
        let meta = request.auth.as_ref()?;
        let requirement = Requirement {
            owner_type: self.policy.owner_type(meta),
            credential_type: self.policy.credential_type(meta),
        };
        if self.registry.register(fingerprint.clone(), requirement) {
            debug!(%fingerprint, "registered endpoint requirement");
        }
        self.registry.lookup(fingerprint)
    }

    /// Executes the request, authenticating it if its endpoint requires it.
    ///
    /// Responses are returned whatever their status once the policy no
    /// longer asks for a refresh or `max_attempts` is reached.
    ///
    /// # Errors
    ///
    /// - Owner resolution failures (`FlowCanceled`, `AuthenticationRequired`).
    /// - Refresh failures, shared with every request queued behind the refresh.
    /// - Transport errors, passed through without retry.
    #[instrument(
        name = "authenticated_request",
        skip_all,
        fields(method = %request.method, fingerprint, attempts)
    )]
    pub async fn execute(&self, request: &RequestSpec) -> AuthResult<ResponseSpec> {
        let fingerprint = request.fingerprint();
        Span::current().record("fingerprint", fingerprint.as_str());

        let Some(requirement) = self.requirement_at(request, &fingerprint) else {
            debug!("no authentication requirement, passing through");
            return Ok(self.client.execute(request).await?);
        };

        let mut try_count: u32 = 0;
        let mut rejected: Option<Credential> = None;
        loop {
            let credential = self
                .coordinator
                .run(|| self.acquire(&requirement, rejected.as_ref()))
                .await?;

            let authenticated = self
                .policy
                .authenticate_request(request.clone(), &credential)?;
            let response = self.client.execute(&authenticated).await?;
            try_count += 1;
            Span::current().record("attempts", try_count);

            if !self.policy.refresh_required(try_count, &response) {
                return Ok(response);
            }
            if try_count >= self.settings.max_attempts {
                warn!(
                    try_count,
                    status = response.status,
                    "attempt limit reached, returning last response"
                );
                return Ok(response);
            }

            debug!(
                try_count,
                status = response.status,
                token = %credential.preview(),
                "credential rejected, refreshing and retrying"
            );
            rejected = Some(credential);
        }
    }

    async fn acquire(
        &self,
        requirement: &Requirement,
        rejected: Option<&Credential>,
    ) -> AuthResult<Credential> {
        let owner = self
            .owners
            .resolve(&requirement.owner_type, &requirement.credential_type)
            .await?;
        self.credentials
            .resolve(&owner, &requirement.credential_type, rejected)
            .await
    }

    /// The owner resolver, for switching or logging out owners.
    pub const fn owners(&self) -> &OwnerResolver<O> {
        &self.owners
    }

    /// Logs `owner` out and discards every credential stored for it.
    ///
    /// Returns whether the owner existed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::Storage`] if owner or credential storage fails.
    pub async fn logout(&self, owner_type: &OwnerType, owner: &O) -> AuthResult<bool> {
        let removed = self.owners.logout(owner_type, owner).await?;
        self.credentials.forget(owner).await?;
        Ok(removed)
    }

    /// The requirement registry shared by this interceptor.
    #[must_use]
    pub fn registry(&self) -> Arc<RequirementRegistry> {
        Arc::clone(&self.registry)
    }

    /// The refresh coordinator shared by this interceptor.
    #[must_use]
    pub fn coordinator(&self) -> Arc<RefreshCoordinator> {
        Arc::clone(&self.coordinator)
    }
}

/// Error returned when a required builder part is missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A required collaborator was not supplied.
    #[error("missing {0}")]
    Missing(&'static str),

    /// The settings are out of range.
    #[error(transparent)]
    Settings(#[from] authgate_domain::DomainError),
}

/// Builder for [`AuthInterceptor`].
///
/// Registry and coordinator default to fresh instances; pass shared ones to
/// make several interceptors refresh as one.
pub struct AuthInterceptorBuilder<O: Owner, C: HttpClient> {
    owner_storage: Option<Arc<dyn OwnerStorage<O>>>,
    credential_storage: Option<Arc<dyn CredentialStorage<O>>>,
    policy: Option<Arc<dyn AuthenticationPolicy<O>>>,
    client: Option<Arc<C>>,
    clock: Option<Arc<dyn Clock>>,
    registry: Option<Arc<RequirementRegistry>>,
    coordinator: Option<Arc<RefreshCoordinator>>,
    settings: AuthSettings,
}

impl<O: Owner, C: HttpClient> Default for AuthInterceptorBuilder<O, C> {
    fn default() -> Self {
        Self {
            owner_storage: None,
            credential_storage: None,
            policy: None,
            client: None,
            clock: None,
            registry: None,
            coordinator: None,
            settings: AuthSettings::default(),
        }
    }
}

impl<O: Owner, C: HttpClient> AuthInterceptorBuilder<O, C> {
    /// Sets the owner storage.
    #[must_use]
    pub fn owner_storage(mut self, storage: Arc<dyn OwnerStorage<O>>) -> Self {
        self.owner_storage = Some(storage);
        self
    }

    /// Sets the credential storage.
    #[must_use]
    pub fn credential_storage(mut self, storage: Arc<dyn CredentialStorage<O>>) -> Self {
        self.credential_storage = Some(storage);
        self
    }

    /// Sets the authentication policy.
    #[must_use]
    pub fn policy(mut self, policy: Arc<dyn AuthenticationPolicy<O>>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn http_client(mut self, client: Arc<C>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the clock used for expiry checks.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Shares a requirement registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<RequirementRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Shares a refresh coordinator.
    #[must_use]
    pub fn coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Replaces the settings.
    #[must_use]
    pub fn settings(mut self, settings: AuthSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the interceptor.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator is missing or the settings are invalid.
    pub fn build(self) -> Result<AuthInterceptor<O, C>, BuildError> {
        self.settings.validate()?;
        let owner_storage = self.owner_storage.ok_or(BuildError::Missing("owner storage"))?;
        let credential_storage = self
            .credential_storage
            .ok_or(BuildError::Missing("credential storage"))?;
        let policy = self.policy.ok_or(BuildError::Missing("authentication policy"))?;
        let client = self.client.ok_or(BuildError::Missing("HTTP client"))?;
        let clock = self.clock.ok_or(BuildError::Missing("clock"))?;

        Ok(AuthInterceptor {
            owners: OwnerResolver::new(owner_storage, Arc::clone(&policy)),
            credentials: CredentialResolver::new(
                credential_storage,
                Arc::clone(&policy),
                clock,
                self.settings.expiry_leeway_secs,
            ),
            client,
            policy,
            registry: self.registry.unwrap_or_default(),
            coordinator: self.coordinator.unwrap_or_default(),
            settings: self.settings,
        })
    }
}
