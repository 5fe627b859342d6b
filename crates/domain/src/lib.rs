//! Authgate Domain - Core types for the credential interceptor
//!
//! This crate defines owners, credentials, authentication requirements and
//! the request/response model the interceptor operates on.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;
pub mod settings;

pub use auth::{
    AuthMetadata, Credential, CredentialType, Owner, OwnerType, Requirement, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, QueryParam, QueryParams, RequestFingerprint, RequestSpec};
pub use response::ResponseSpec;
pub use settings::{AuthSettings, MAX_EXPIRY_LEEWAY_SECS};
