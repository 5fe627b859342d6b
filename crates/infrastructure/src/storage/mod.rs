//! Storage adapters.

mod memory;

pub use memory::{InMemoryCredentialStorage, InMemoryOwnerStorage, OwnerFactory};
