//! Interceptor settings persistence.
//!
//! Settings are read from a JSON file (missing file means defaults) and
//! then overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `AUTHGATE_MAX_ATTEMPTS` | `max_attempts` |
//! | `AUTHGATE_EXPIRY_LEEWAY_SECS` | `expiry_leeway_secs` |
//! | `AUTHGATE_USER_AGENT` | `user_agent` |
//! | `AUTHGATE_REQUEST_TIMEOUT_MS` | `request_timeout_ms` |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use authgate_domain::{AuthSettings, DomainError};
use tokio::fs;
use tracing::{debug, info};

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "AUTHGATE_";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidOverride {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
    },

    /// The merged settings are out of range.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Loads and saves [`AuthSettings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: PathBuf,
}

impl SettingsRepository {
    /// Creates a repository for the settings file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings from disk and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed, an override
    /// does not parse, or the result fails validation.
    pub async fn load(&self) -> Result<AuthSettings, SettingsError> {
        self.load_with(|name| std::env::var(name).ok()).await
    }

    /// Like [`load`](Self::load) with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_with<F>(&self, lookup: F) -> Result<AuthSettings, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = if fs::try_exists(&self.path).await? {
            let content = fs::read(&self.path).await?;
            from_json_bytes(&content)?
        } else {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            AuthSettings::default()
        };

        apply_overrides(&mut settings, lookup)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Writes settings to disk, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, settings: &AuthSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = to_json_stable(settings)?;
        fs::write(&self.path, content).await?;
        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

fn apply_overrides<F>(settings: &mut AuthSettings, lookup: F) -> Result<(), SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = parsed(&lookup, "MAX_ATTEMPTS")? {
        settings.max_attempts = value;
    }
    if let Some(value) = parsed(&lookup, "EXPIRY_LEEWAY_SECS")? {
        settings.expiry_leeway_secs = value;
    }
    if let Some(value) = lookup(&format!("{ENV_PREFIX}USER_AGENT")) {
        settings.user_agent = value;
    }
    if let Some(value) = parsed(&lookup, "REQUEST_TIMEOUT_MS")? {
        settings.request_timeout_ms = value;
    }
    Ok(())
}

fn parsed<T, F>(lookup: &F, suffix: &str) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let name = format!("{ENV_PREFIX}{suffix}");
    let Some(value) = lookup(&name) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => {
            debug!(%name, "settings override applied");
            Ok(Some(parsed))
        }
        Err(_) => Err(SettingsError::InvalidOverride { name, value }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("settings.json"));

        let settings = repo.load_with(env(&[])).await.unwrap();

        assert_eq!(settings, AuthSettings::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("nested").join("settings.json"));
        let settings = AuthSettings {
            max_attempts: 5,
            ..AuthSettings::default()
        };

        repo.save(&settings).await.unwrap();
        let loaded = repo.load_with(env(&[])).await.unwrap();

        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn test_environment_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"max_attempts": 4, "user_agent": "file"}"#)
            .await
            .unwrap();
        let repo = SettingsRepository::new(&path);

        let settings = repo
            .load_with(env(&[
                ("AUTHGATE_MAX_ATTEMPTS", "2"),
                ("AUTHGATE_REQUEST_TIMEOUT_MS", " 1500 "),
            ]))
            .await
            .unwrap();

        assert_eq!(settings.max_attempts, 2);
        assert_eq!(settings.request_timeout_ms, 1500);
        assert_eq!(settings.user_agent, "file");
    }

    #[tokio::test]
    async fn test_unparsable_override_is_an_error() {
        let dir = tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("settings.json"));

        let result = repo
            .load_with(env(&[("AUTHGATE_EXPIRY_LEEWAY_SECS", "soon")]))
            .await;

        assert!(matches!(
            result,
            Err(SettingsError::InvalidOverride { name, .. }) if name == "AUTHGATE_EXPIRY_LEEWAY_SECS"
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_value_is_rejected() {
        let dir = tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("settings.json"));

        let result = repo.load_with(env(&[("AUTHGATE_MAX_ATTEMPTS", "0")])).await;

        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_unbounded_leeway_is_rejected() {
        let dir = tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("settings.json"));

        let result = repo
            .load_with(env(&[("AUTHGATE_EXPIRY_LEEWAY_SECS", "9223372036854775807")]))
            .await;

        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }
}
