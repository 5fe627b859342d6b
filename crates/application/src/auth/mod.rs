//! Credential resolution core.
//!
//! This module provides:
//! - The requirement registry (fingerprint → requirement)
//! - Owner and credential resolvers
//! - The refresh coordinator, the single-flight gate every
//!   credential lookup goes through

mod coordinator;
mod credential_resolver;
mod owner_resolver;
mod registry;

pub use coordinator::RefreshCoordinator;
pub use credential_resolver::CredentialResolver;
pub use owner_resolver::OwnerResolver;
pub use registry::RequirementRegistry;
