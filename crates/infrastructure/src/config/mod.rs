//! Settings loading.

mod settings_repository;

pub use settings_repository::{ENV_PREFIX, SettingsError, SettingsRepository};
