//! Port definitions (interfaces)
//!
//! Ports define the boundary between the interceptor core and the
//! collaborators it consumes: owner storage, credential storage, the
//! per-application authentication policy, the HTTP transport and a clock.
//! Adapters live in the infrastructure crate.

mod clock;
mod http_client;
mod policy;
mod storage;

pub use clock::Clock;
pub use http_client::{HttpClient, HttpClientError};
pub use policy::{AuthenticationPolicy, BoxError};
pub use storage::{CredentialStorage, OwnerCreation, OwnerStorage, StorageError};
