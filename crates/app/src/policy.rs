//! Bearer-token policy for the smoke binary.

use async_trait::async_trait;
use authgate_application::ports::{AuthenticationPolicy, BoxError};
use authgate_domain::{
    AuthMetadata, Credential, CredentialType, DomainResult, OwnerType, RequestSpec,
};

pub const OWNER_TYPE: &str = "account";
pub const CREDENTIAL_TYPE: &str = "bearer";

/// Sends the stored token as `Authorization: Bearer <token>`.
///
/// A static token cannot be renewed, so a rejected token ends the request
/// with a missing-credential error.
pub struct StaticBearerPolicy;

#[async_trait]
impl AuthenticationPolicy<String> for StaticBearerPolicy {
    fn owner_type(&self, _meta: &AuthMetadata) -> OwnerType {
        OwnerType::new(OWNER_TYPE)
    }

    fn credential_type(&self, _meta: &AuthMetadata) -> CredentialType {
        CredentialType::new(CREDENTIAL_TYPE)
    }

    fn authenticate_request(
        &self,
        mut request: RequestSpec,
        credential: &Credential,
    ) -> DomainResult<RequestSpec> {
        request.set_header("Authorization", format!("Bearer {}", credential.token))?;
        Ok(request)
    }

    async fn refresh_credentials(
        &self,
        _owner: &String,
        _credential_type: &CredentialType,
        _credential: Credential,
    ) -> Result<Option<Credential>, BoxError> {
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sets_bearer_header() {
        let request = StaticBearerPolicy
            .authenticate_request(
                RequestSpec::get("https://api.example.com/me"),
                &Credential::new("s3cret"),
            )
            .unwrap();

        assert_eq!(request.headers.get("authorization"), Some("Bearer s3cret"));
    }
}
