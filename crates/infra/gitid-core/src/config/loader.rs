//! Settings loader with env overrides.
//!
//! The loading process:
//! 1. Start from defaults
//! 2. Read the global file `~/.config/gitid/gitid.json` (or `$GITID_CONFIG`)
//! 3. Apply env var overrides (highest precedence)
//!
//! CLI flags are applied on top by the binary.

use super::types::Settings;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Directory name under config_dir for the settings file.
pub const GLOBAL_DIR: &str = "gitid";

/// Filename for the settings file.
pub const GLOBAL_FILE: &str = "gitid.json";

/// Env var pointing at an alternative settings file.
pub const CONFIG_ENV: &str = "GITID_CONFIG";

/// Result of loading settings.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,

    /// File the settings were read from, when it existed.
    pub source: Option<PathBuf>,
}

/// Get the settings file path.
///
/// `$GITID_CONFIG` wins; otherwise `~/.config/gitid/gitid.json` on Unix-like systems.
pub fn global_settings_path() -> Result<PathBuf> {
    if let Some(path) = env_trimmed(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().context("Could not determine config dir")?;
    Ok(base.join(GLOBAL_DIR).join(GLOBAL_FILE))
}

/// Load settings from the global file and the environment.
///
/// Failures surface as [`crate::GitIdError::Settings`].
pub fn load_settings() -> crate::error::Result<LoadedSettings> {
    load_settings_from(&global_settings_path()?)
}

/// Load settings from `path` (missing file means defaults), then apply env overrides.
pub fn load_settings_from(path: &Path) -> crate::error::Result<LoadedSettings> {
    let (mut settings, source) = match read_json_object(path)? {
        Some(v) => {
            let settings: Settings = serde_json::from_value(v)
                .with_context(|| format!("Invalid settings in {}", path.display()))?;
            (settings, Some(path.to_path_buf()))
        }
        None => (Settings::default(), None),
    };

    apply_env_overrides(&mut settings);
    tracing::debug!(?settings, ?source, "Loaded settings");

    Ok(LoadedSettings { settings, source })
}

/// Apply environment variable overrides to the settings.
fn apply_env_overrides(settings: &mut Settings) {
    if let Some(v) = env_trimmed("GITID_PREFIX") {
        settings.prefix = v;
    }
    if let Some(v) = env_trimmed("GITID_USER") {
        settings.user = v;
    }
    if let Some(v) = env_trimmed("GITID_SSH_DIR") {
        settings.ssh_dir = Some(PathBuf::from(v));
    }
}

/// Helper to read and normalize an env var (trim + filter empty).
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a JSON object from `path`; `None` when the file does not exist.
fn read_json_object(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;

    let v: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match v {
        Value::Object(_) => Ok(Some(v)),
        _ => anyhow::bail!("Settings root must be a JSON object: {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitIdError;
    use serial_test::serial;
    use tempfile::TempDir;

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: tests are serialized with #[serial]
            unsafe { std::env::set_var(key, value) };
            Self { key, prev }
        }

        fn remove(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: tests are serialized with #[serial]
            unsafe { std::env::remove_var(key) };
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: tests are serialized with #[serial]
            unsafe {
                match &self.prev {
                    Some(v) => std::env::set_var(self.key, v),
                    None => std::env::remove_var(self.key),
                }
            }
        }
    }

    fn clear_overrides() -> Vec<EnvGuard> {
        ["GITID_PREFIX", "GITID_USER", "GITID_SSH_DIR"]
            .into_iter()
            .map(EnvGuard::remove)
            .collect()
    }

    #[test]
    #[serial]
    fn test_missing_file_gives_defaults() {
        let _env = clear_overrides();
        let temp = TempDir::new().unwrap();

        let loaded = load_settings_from(&temp.path().join("gitid.json")).unwrap();
        assert_eq!(loaded.settings, Settings::default());
        assert!(loaded.source.is_none());
    }

    #[test]
    #[serial]
    fn test_file_values_are_used() {
        let _env = clear_overrides();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gitid.json");
        std::fs::write(&path, r#"{"prefix": "me", "ssh_dir": "/tmp/ssh"}"#).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.settings.prefix, "me");
        assert_eq!(loaded.settings.user, "git");
        assert_eq!(loaded.settings.ssh_dir, Some(PathBuf::from("/tmp/ssh")));
        assert_eq!(loaded.source, Some(path));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let _env = clear_overrides();
        let _prefix = EnvGuard::set("GITID_PREFIX", "  corp ");
        let _user = EnvGuard::set("GITID_USER", "");
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gitid.json");
        std::fs::write(&path, r#"{"prefix": "me", "user": "deploy"}"#).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.settings.prefix, "corp");
        // Empty env values are ignored
        assert_eq!(loaded.settings.user, "deploy");
    }

    #[test]
    #[serial]
    fn test_rejects_non_object_root() {
        let _env = clear_overrides();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gitid.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = load_settings_from(&path).unwrap_err();
        assert!(matches!(err, GitIdError::Settings(_)));
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    #[serial]
    fn test_invalid_json_is_a_settings_error() {
        let _env = clear_overrides();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gitid.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_settings_from(&path).unwrap_err();
        assert!(matches!(err, GitIdError::Settings(_)));
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    #[serial]
    fn test_config_env_points_at_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.json");
        let _cfg = EnvGuard::set(CONFIG_ENV, path.to_str().unwrap());

        assert_eq!(global_settings_path().unwrap(), path);
    }
}
