//! Authentication domain types
//!
//! Owners are the principals credentials belong to; credentials are scoped to
//! exactly one (owner, credential type) pair. A [`Requirement`] is the static
//! authentication property of an endpoint.

mod credential;
mod types;

pub use credential::{Credential, token_preview};
pub use types::{AuthMetadata, CredentialType, Owner, OwnerType, Requirement};
