//! Authentication policy port

use async_trait::async_trait;
use authgate_domain::{
    AuthMetadata, Credential, CredentialType, DomainResult, Owner, OwnerType, RequestSpec,
    ResponseSpec,
};

/// Boxed error returned by policy callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-application authentication policy.
///
/// Maps endpoint annotations to owner and credential types, decorates
/// requests, and decides when a credential must be refreshed. Only the
/// three mapping/decoration methods are mandatory.
#[async_trait]
pub trait AuthenticationPolicy<O: Owner>: Send + Sync {
    /// Owner type required by an endpoint.
    fn owner_type(&self, meta: &AuthMetadata) -> OwnerType;

    /// Credential type required by an endpoint.
    fn credential_type(&self, meta: &AuthMetadata) -> CredentialType;

    /// Attaches the credential to the request (header, query parameter, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cannot be expressed on the request.
    fn authenticate_request(
        &self,
        request: RequestSpec,
        credential: &Credential,
    ) -> DomainResult<RequestSpec>;

    /// Whether a stored credential may be used as is.
    fn is_credential_valid(&self, _credential: &Credential) -> bool {
        true
    }

    /// Produces a fresh credential from a stale one.
    ///
    /// `Ok(None)` means no credential could be issued. Implementations should
    /// bound their own run time: every other authenticated request waits
    /// while this runs.
    ///
    /// # Errors
    ///
    /// Any error is shared with every request queued behind this refresh.
    async fn refresh_credentials(
        &self,
        _owner: &O,
        _credential_type: &CredentialType,
        credential: Credential,
    ) -> Result<Option<Credential>, BoxError> {
        Ok(Some(credential))
    }

    /// Whether the response means the credential was rejected and the
    /// request should be retried with a refreshed one.
    ///
    /// `try_count` is the number of attempts made so far, starting at 1.
    /// The default allows exactly one forced refresh, on HTTP 401.
    fn refresh_required(&self, try_count: u32, response: &ResponseSpec) -> bool {
        response.is_unauthorized() && try_count <= 1
    }

    /// Picks the owner to adopt when none is active. `None` cancels.
    async fn choose_owner(&self, owners: &[O]) -> Option<O> {
        owners.first().cloned()
    }
}
