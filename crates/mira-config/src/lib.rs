//! Configuration management for MIRA chat widgets.
//!
//! Each site variant ships its own `mira.toml` describing the assistant
//! persona and the chat-completion provider it talks to. Files are parsed
//! with serde and auto-discovered in the current directory and its parents.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `provider.endpoint`
//! - `provider.model`
//! - `provider.api_key`
//! - values of `provider.headers`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override provider model.
    pub model: Option<String>,
    /// Override provider endpoint.
    pub endpoint: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mira.toml";

/// Default chat-completion endpoint.
const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier.
const DEFAULT_MODEL: &str = "nvidia/nemotron-nano-9b-v2:free";

/// Reply shown in the conversation when the provider cannot be reached.
const DEFAULT_ERROR_REPLY: &str =
    "Sorry — there was an error contacting the assistant. Please try again.";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Assistant persona configuration.
    pub assistant: AssistantConfig,
    /// Chat-completion provider configuration.
    pub provider: ProviderConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Assistant persona and conversation behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Display name shown next to assistant messages.
    pub name: String,
    /// System instructions sent with every request.
    pub instructions: Option<String>,
    /// File to read system instructions from, relative to the config file.
    pub instructions_file: Option<String>,
    /// First assistant message of a new conversation.
    pub greeting: Option<String>,
    /// Also prepend the instructions as a header block to the latest user message.
    pub embed_instructions: bool,
    /// Send the whole conversation, not only the latest user message.
    pub send_history: bool,
    /// Assistant message appended when a request fails.
    pub error_reply: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "MIRA".to_owned(),
            instructions: None,
            instructions_file: None,
            greeting: None,
            embed_instructions: false,
            send_history: true,
            error_reply: DEFAULT_ERROR_REPLY.to_owned(),
        }
    }
}

impl AssistantConfig {
    /// System instructions, or an empty string when none are configured.
    #[must_use]
    pub fn instructions(&self) -> &str {
        self.instructions.as_deref().unwrap_or_default()
    }
}

/// Chat-completion provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Chat-completion endpoint URL (the provider directly, or a proxy).
    pub endpoint: String,
    /// Model identifier sent in the request body.
    pub model: String,
    /// Bearer token. Leave unset when a proxy attaches the credential.
    pub api_key: Option<String>,
    /// Extra request headers (e.g. `HTTP-Referer`, `X-Title`).
    pub headers: BTreeMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            headers: BTreeMap::new(),
        }
    }
}

impl ProviderConfig {
    /// API key if configured and non-empty.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
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
        /// Config field path (e.g., "`provider.api_key`").
        field: String,
        /// Error message (e.g., "${`OPENROUTER_API_KEY`} not set").
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

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mira.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(model) = &settings.model {
            self.provider.model.clone_from(model);
        }
        if let Some(endpoint) = &settings.endpoint {
            self.provider.endpoint.clone_from(endpoint);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_config_from(current)
    }

    fn discover_config_from(mut current: PathBuf) -> Option<PathBuf> {
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

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_instructions(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            model = %config.provider.model,
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_provider()?;
        self.validate_assistant()?;
        Ok(())
    }

    fn validate_provider(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.provider.endpoint, "provider.endpoint")?;
        require_http_url(&self.provider.endpoint, "provider.endpoint")?;
        require_non_empty(&self.provider.model, "provider.model")?;
        for name in self.provider.headers.keys() {
            require_non_empty(name.trim(), "provider.headers key")?;
        }
        Ok(())
    }

    fn validate_assistant(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.assistant.name, "assistant.name")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let provider = &mut self.provider;
        provider.endpoint = expand::expand_env(&provider.endpoint, "provider.endpoint")?;
        provider.model = expand::expand_env(&provider.model, "provider.model")?;
        if let Some(ref key) = provider.api_key {
            provider.api_key = Some(expand::expand_env(key, "provider.api_key")?);
        }
        for (name, value) in &mut provider.headers {
            *value = expand::expand_env(value, &format!("provider.headers.{name}"))?;
        }
        Ok(())
    }

    /// Read `assistant.instructions_file` into `assistant.instructions`.
    fn resolve_instructions(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let Some(file) = &self.assistant.instructions_file else {
            return Ok(());
        };
        if self.assistant.instructions.is_some() {
            return Err(ConfigError::Validation(
                "assistant.instructions and assistant.instructions_file are mutually exclusive"
                    .to_owned(),
            ));
        }
        let path = config_dir.join(file);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ConfigError::Validation(format!(
                "cannot read assistant.instructions_file {}: {e}",
                path.display()
            ))
        })?;
        self.assistant.instructions = Some(content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.assistant.name, "MIRA");
        assert_eq!(
            config.provider.endpoint,
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(config.provider.model, "nvidia/nemotron-nano-9b-v2:free");
        assert!(config.assistant.send_history);
        assert!(!config.assistant.embed_instructions);
        assert_eq!(config.assistant.instructions(), "");
        assert!(config.provider.api_key().is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.assistant.name, "MIRA");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[assistant]
name = "Careers"
instructions = "Answer hiring questions."
greeting = "Hi!"
embed_instructions = true
send_history = false
error_reply = "Try later."

[provider]
endpoint = "https://marktist.example/api/mira"
model = "openai/gpt-4o-mini"
api_key = "sk-123"

[provider.headers]
"HTTP-Referer" = "https://marktist.example"
"X-Title" = "MIRA Marketing Assistant"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.assistant.name, "Careers");
        assert_eq!(config.assistant.instructions(), "Answer hiring questions.");
        assert_eq!(config.assistant.greeting.as_deref(), Some("Hi!"));
        assert!(config.assistant.embed_instructions);
        assert!(!config.assistant.send_history);
        assert_eq!(config.assistant.error_reply, "Try later.");
        assert_eq!(config.provider.model, "openai/gpt-4o-mini");
        assert_eq!(config.provider.api_key(), Some("sk-123"));
        assert_eq!(
            config.provider.headers.get("X-Title").map(String::as_str),
            Some("MIRA Marketing Assistant")
        );
    }

    #[test]
    fn test_empty_api_key_treated_as_absent() {
        let toml = r#"
[provider]
api_key = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.provider.api_key().is_none());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            model: Some("meta/llama".to_owned()),
            ..Default::default()
        });
        assert_eq!(config.provider.model, "meta/llama");
        assert_eq!(
            config.provider.endpoint,
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.provider.model, ProviderConfig::default().model);
    }

    #[test]
    fn test_expand_env_vars_provider() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MIRA_CONFIG_TEST_KEY", "sk-env");
            std::env::set_var("MIRA_CONFIG_TEST_ORIGIN", "https://site.example");
        }

        let toml = r#"
[provider]
api_key = "${MIRA_CONFIG_TEST_KEY}"

[provider.headers]
"HTTP-Referer" = "${MIRA_CONFIG_TEST_ORIGIN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.provider.api_key(), Some("sk-env"));
        assert_eq!(
            config.provider.headers.get("HTTP-Referer").map(String::as_str),
            Some("https://site.example")
        );

        unsafe {
            std::env::remove_var("MIRA_CONFIG_TEST_KEY");
            std::env::remove_var("MIRA_CONFIG_TEST_ORIGIN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_header_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MIRA_CONFIG_TEST_MISSING");
        }

        let toml = r#"
[provider.headers]
"X-Title" = "${MIRA_CONFIG_TEST_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("provider.headers.X-Title"));
    }

    /// Assert that validation fails with expected substrings in the error message.
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
    fn test_validate_endpoint_empty() {
        let mut config = Config::default();
        config.provider.endpoint = String::new();
        assert_validation_error(&config, &["provider.endpoint", "empty"]);
    }

    #[test]
    fn test_validate_endpoint_scheme() {
        let mut config = Config::default();
        config.provider.endpoint = "ftp://openrouter.ai".to_owned();
        assert_validation_error(&config, &["provider.endpoint", "http"]);
    }

    #[test]
    fn test_validate_model_empty() {
        let mut config = Config::default();
        config.provider.model = String::new();
        assert_validation_error(&config, &["provider.model"]);
    }

    #[test]
    fn test_validate_assistant_name_empty() {
        let mut config = Config::default();
        config.assistant.name = String::new();
        assert_validation_error(&config, &["assistant.name"]);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/mira.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_reads_instructions_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instructions.txt"), "ROLE DEFINITION\nBe precise.").unwrap();
        let path = dir.path().join("mira.toml");
        std::fs::write(
            &path,
            "[assistant]\ninstructions_file = \"instructions.txt\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.assistant.instructions(), "ROLE DEFINITION\nBe precise.");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_instructions_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mira.toml");
        std::fs::write(
            &path,
            "[assistant]\ninstructions = \"a\"\ninstructions_file = \"b.txt\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_load_missing_instructions_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mira.toml");
        std::fs::write(&path, "[assistant]\ninstructions_file = \"missing.txt\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_load_applies_and_validates_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mira.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            endpoint: Some("not-a-url".to_owned()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(err.to_string().contains("provider.endpoint"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mira.toml");
        std::fs::write(&path, "[provider\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site/careers");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("mira.toml"), "").unwrap();

        let found = Config::discover_config_from(nested).unwrap();
        assert_eq!(found, dir.path().join("mira.toml"));
    }
}
