//! Loader configuration.
//!
//! # Configuration File Format
//!
//! ```toml
//! binding_key = "ps"
//! policy = "permissive"
//! ```
//!
//! # Environment Variable Overrides
//!
//! With [`LoaderConfig::with_env_prefix`], values can be overridden using
//! `PREFIX__KEY` variables:
//!
//! - `PARAMSTORE__BINDING_KEY=env`
//! - `PARAMSTORE__POLICY=strict`

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scan::BindingPolicy;

/// Binding key used when none is configured.
pub const DEFAULT_BINDING_KEY: &str = "param";

/// Settings for a [`ParamsLoader`](crate::ParamsLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Which binding scheme to read from field annotations.
    pub binding_key: String,
    /// How unbound fields are treated.
    pub policy: BindingPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            binding_key: DEFAULT_BINDING_KEY.to_string(),
            policy: BindingPolicy::Strict,
        }
    }
}

impl LoaderConfig {
    /// Creates a strict configuration for `binding_key`.
    pub fn new(binding_key: impl Into<String>) -> Self {
        Self {
            binding_key: binding_key.into(),
            policy: BindingPolicy::Strict,
        }
    }

    /// Sets the binding policy.
    pub fn with_policy(mut self, policy: BindingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parses configuration from a string in `toml` or `json` format.
    ///
    /// # Example
    ///
    /// ```
    /// use paramstore::{BindingPolicy, LoaderConfig};
    ///
    /// let config = LoaderConfig::from_str_format(r#"
    ///     binding_key = "ps"
    ///     policy = "permissive"
    /// "#, "toml").unwrap();
    ///
    /// assert_eq!(config.binding_key, "ps");
    /// assert_eq!(config.policy, BindingPolicy::Permissive);
    /// ```
    pub fn from_str_format(content: &str, format: &str) -> Result<Self, ConfigError> {
        let config: Self = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a `.toml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some(format @ ("toml" | "json")) => Self::from_str_format(&content, format),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Applies `PREFIX__BINDING_KEY` and `PREFIX__POLICY` from the environment.
    pub fn with_env_prefix(mut self, prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        for (key, value) in env::vars().filter(|(k, _)| k.starts_with(&prefix)) {
            self.apply_env_var(&key, &value, &prefix)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding_key.trim().is_empty() {
            return Err(ConfigError::invalid_value("binding_key", "must not be empty"));
        }
        Ok(())
    }

    // Apply a single environment variable
    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(name) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };

        match name {
            "BINDING_KEY" => self.binding_key = value.to_string(),
            "POLICY" => {
                self.policy = value
                    .parse()
                    .map_err(|reason: String| ConfigError::env_parse_error(key, reason))?;
            }
            // Unknown key - ignore
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.binding_key, "param");
        assert_eq!(config.policy, BindingPolicy::Strict);
    }

    #[test]
    fn test_from_json() {
        let config = LoaderConfig::from_str_format(r#"{"binding_key": "env"}"#, "json").unwrap();
        assert_eq!(config.binding_key, "env");
        assert_eq!(config.policy, BindingPolicy::Strict);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = LoaderConfig::from_str_format("binding_key = \"ps\"\nretries = 3", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_empty_binding_key_rejected() {
        let result = LoaderConfig::from_str_format("binding_key = \"\"", "toml");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_unsupported_format() {
        let result = LoaderConfig::from_str_format("binding_key: ps", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "binding_key = \"ps\"\npolicy = \"permissive\"").unwrap();
        let config = LoaderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.binding_key, "ps");
        assert_eq!(config.policy, BindingPolicy::Permissive);

        assert!(matches!(
            LoaderConfig::from_file("/nonexistent/loader.toml"),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_apply_env_var() {
        let mut config = LoaderConfig::default();
        config.apply_env_var("TEST__BINDING_KEY", "env", "TEST").unwrap();
        config.apply_env_var("TEST__POLICY", "permissive", "TEST").unwrap();
        config.apply_env_var("TEST__UNKNOWN", "x", "TEST").unwrap();
        assert_eq!(config.binding_key, "env");
        assert_eq!(config.policy, BindingPolicy::Permissive);
    }

    #[test]
    fn test_apply_env_var_invalid_policy() {
        let mut config = LoaderConfig::default();
        let result = config.apply_env_var("TEST__POLICY", "lenient", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }

    #[test]
    fn test_with_env_prefix() {
        std::env::set_var("PARAMSTORE_CFG_TEST__BINDING_KEY", "vault");
        let config = LoaderConfig::default()
            .with_env_prefix("paramstore_cfg_test")
            .unwrap();
        assert_eq!(config.binding_key, "vault");
    }
}
