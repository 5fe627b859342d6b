//! Authgate Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading and
//! tracing setup for binaries.

pub mod adapters;
pub mod config;
pub mod serialization;
pub mod storage;
pub mod telemetry;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use config::{SettingsError, SettingsRepository};
pub use serialization::SerializationError;
pub use storage::{InMemoryCredentialStorage, InMemoryOwnerStorage, OwnerFactory};
pub use telemetry::init_tracing;
