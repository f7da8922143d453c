//! Configuration management for chatmark.
//!
//! Parses `chatmark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Every section and
//! field is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [engine]
//! max_uses = 30
//! max_input_bytes = 100000
//! max_nesting = 32
//!
//! [avatar]
//! base_url = "https://secure.gravatar.com/avatar"
//! size = 30
//! default_icon = "identicon"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `avatar.base_url`
//! - `avatar.default_icon`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "chatmark.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine limits and recycling.
    pub engine: EngineConfig,
    /// Avatar image URLs.
    pub avatar: AvatarConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Conversions served by one engine before it is replaced.
    pub max_uses: u32,
    /// Largest accepted input, in bytes.
    pub max_input_bytes: usize,
    /// Deepest accepted block or inline nesting.
    pub max_nesting: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_uses: 30,
            max_input_bytes: 100_000,
            max_nesting: 32,
        }
    }
}

/// Avatar configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// URL prefix the address digest is appended to.
    pub base_url: String,
    /// Image size in pixels.
    pub size: u32,
    /// Icon served for unknown addresses.
    pub default_icon: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://secure.gravatar.com/avatar".to_owned(),
            size: 30,
            default_icon: "identicon".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`avatar.base_url`").
        field: String,
        /// Error message (e.g., "${`AVATAR_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a numeric field to lie within `min..=max`.
fn require_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::Validation(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `chatmark.toml` in the current directory and
    /// its parents, falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing, expansion or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Search for a config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_engine()?;
        self.validate_avatar()?;
        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        const MAX_NESTING: usize = 256;

        if self.engine.max_uses == 0 {
            return Err(ConfigError::Validation(
                "engine.max_uses must be greater than 0".to_owned(),
            ));
        }
        if self.engine.max_input_bytes == 0 {
            return Err(ConfigError::Validation(
                "engine.max_input_bytes must be greater than 0".to_owned(),
            ));
        }
        require_range(self.engine.max_nesting, 1, MAX_NESTING, "engine.max_nesting")
    }

    fn validate_avatar(&self) -> Result<(), ConfigError> {
        const MAX_SIZE: u32 = 2048;

        require_non_empty(&self.avatar.base_url, "avatar.base_url")?;
        require_http_url(&self.avatar.base_url, "avatar.base_url")?;
        require_non_empty(&self.avatar.default_icon, "avatar.default_icon")?;
        require_range(self.avatar.size, 1, MAX_SIZE, "avatar.size")
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.avatar.base_url = expand::expand_env(&self.avatar.base_url, "avatar.base_url")?;
        self.avatar.default_icon =
            expand::expand_env(&self.avatar.default_icon, "avatar.default_icon")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.max_uses, 30);
        assert_eq!(config.engine.max_input_bytes, 100_000);
        assert_eq!(config.engine.max_nesting, 32);
        assert_eq!(config.avatar.base_url, "https://secure.gravatar.com/avatar");
        assert_eq!(config.avatar.size, 30);
        assert_eq!(config.avatar.default_icon, "identicon");
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.max_uses, 30);
        assert_eq!(config.avatar.size, 30);
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml = r#"
[engine]
max_uses = 5

[avatar]
default_icon = "retro"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.max_uses, 5);
        assert_eq!(config.engine.max_nesting, 32);
        assert_eq!(config.avatar.default_icon, "retro");
        assert_eq!(config.avatar.size, 30);
    }

    #[test]
    fn test_expand_env_vars_avatar() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CHATMARK_TEST_AVATAR_HOST", "avatars.example.org");
        }

        let toml = r#"
[avatar]
base_url = "https://${CHATMARK_TEST_AVATAR_HOST}/avatar"
default_icon = "${CHATMARK_TEST_AVATAR_ICON:-mp}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.avatar.base_url, "https://avatars.example.org/avatar");
        assert_eq!(config.avatar.default_icon, "mp");

        unsafe {
            std::env::remove_var("CHATMARK_TEST_AVATAR_HOST");
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_max_uses_zero() {
        let mut config = Config::default();
        config.engine.max_uses = 0;
        assert_validation_error(&config, &["engine.max_uses", "greater than 0"]);
    }

    #[test]
    fn test_validate_max_nesting_range() {
        let mut config = Config::default();
        config.engine.max_nesting = 1000;
        assert_validation_error(&config, &["engine.max_nesting", "256"]);
    }

    #[test]
    fn test_validate_avatar_url_scheme() {
        let mut config = Config::default();
        config.avatar.base_url = "ftp://avatars.example.org".to_owned();
        assert_validation_error(&config, &["avatar.base_url", "http"]);
    }

    #[test]
    fn test_validate_avatar_size() {
        let mut config = Config::default();
        config.avatar.size = 0;
        assert_validation_error(&config, &["avatar.size"]);
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let err = Config::load(Some(Path::new("/nonexistent/chatmark.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[engine]\nmax_uses = 7\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.engine.max_uses, 7);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[avatar]\nbase_url = \"\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[engine\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path));
    }
}
