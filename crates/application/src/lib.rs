//! Authgate Application - Credential interceptor and ports
//!
//! This crate defines the application layer with:
//! - Port traits (owner/credential storage, policy, HTTP client, clock)
//! - The requirement registry and refresh coordinator
//! - The interceptor that ties them into a request pipeline

pub mod auth;
pub mod error;
pub mod interceptor;
pub mod ports;

#[cfg(test)]
mod testing;

pub use auth::{CredentialResolver, OwnerResolver, RefreshCoordinator, RequirementRegistry};
pub use error::{AuthError, AuthResult, SharedError};
pub use interceptor::{AuthInterceptor, AuthInterceptorBuilder, BuildError};
pub use ports::{
    AuthenticationPolicy, BoxError, Clock, CredentialStorage, HttpClient, HttpClientError,
    OwnerCreation, OwnerStorage, StorageError,
};
