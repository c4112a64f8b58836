//! TOML-based configuration for deep-research
//!
//! Declarative settings for the pipeline, the generation backend, email
//! delivery and logging, read from `research.toml`. Secrets never live in the
//! file: it names the environment variables that hold them.

use crate::llm::{ModelParams, Provider};
use crate::notify::sendgrid::DEFAULT_SENDGRID_API_BASE;
use crate::notify::{DisabledTransport, MailTransport, SendGridTransport};
use crate::research::ResearchSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Root configuration structure loaded from research.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub research: PipelineConfig,

    pub llm: LlmConfig,

    /// Email delivery; reports are not sent when absent
    #[serde(default)]
    pub email: Option<EmailConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= Pipeline Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on searches planned per query
    #[serde(default = "default_max_searches")]
    pub max_searches: usize,

    /// Per-search time limit; unbounded when unset
    #[serde(default)]
    pub search_timeout_secs: Option<u64>,

    #[serde(default = "default_results_per_search")]
    pub results_per_search: usize,

    /// Ground summaries in live web results
    #[serde(default = "default_true")]
    pub web_search: bool,
}

fn default_max_searches() -> usize {
    crate::agents::planner::HOW_MANY_SEARCHES
}

fn default_results_per_search() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_searches: default_max_searches(),
            search_timeout_secs: None,
            results_per_search: default_results_per_search(),
            web_search: true,
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(flatten)]
    pub provider: ProviderConfig,

    pub temperature: Option<f32>,

    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

// ============= Email Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    #[default]
    SendGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub provider: EmailProvider,

    /// Environment variable containing the API key
    #[serde(default = "default_sendgrid_key_env")]
    pub api_key_env: String,

    pub from: String,

    pub to: String,

    #[serde(default = "default_sendgrid_base")]
    pub api_base: String,
}

fn default_sendgrid_key_env() -> String {
    "SENDGRID_API_KEY".to_string()
}

fn default_sendgrid_base() -> String {
    DEFAULT_SENDGRID_API_BASE.to_string()
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl ResearchConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: ResearchConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Check value ranges and that the generation backend's key is available.
    ///
    /// Email credentials are not checked here; a missing key
    /// surfaces as a rejected delivery at the end of a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.research.max_searches == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_searches must be at least 1".to_string(),
            ));
        }
        if self.research.search_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "research.search_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "llm.temperature must be between 0.0 and 2.0, got {}",
                    temperature
                )));
            }
        }

        match &self.llm.provider {
            ProviderConfig::OpenAI {
                api_key_env, model, ..
            } => {
                if cfg!(not(feature = "openai")) {
                    return Err(ConfigError::ValidationError(
                        "llm.type = \"openai\" requires the 'openai' feature".to_string(),
                    ));
                }
                self.validate_env_var(api_key_env)?;
                validate_model(model)?;
            }
            ProviderConfig::Ollama { model, .. } => {
                if cfg!(not(feature = "ollama")) {
                    return Err(ConfigError::ValidationError(
                        "llm.type = \"ollama\" requires the 'ollama' feature".to_string(),
                    ));
                }
                validate_model(model)?;
            }
        }

        if let Some(email) = &self.email {
            if email.from.trim().is_empty() || email.to.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "email.from and email.to must both be set".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Resolve the configured backend into a [`Provider`], reading secrets from the environment.
    pub fn to_provider(&self) -> Result<Provider, ConfigError> {
        let params = ModelParams {
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        };

        match &self.llm.provider {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = std::env::var(api_key_env)
                    .map_err(|_| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                    params,
                })
            }
            ProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
                params,
            }),
        }
    }

    pub fn settings(&self) -> ResearchSettings {
        ResearchSettings {
            max_searches: self.research.max_searches,
            search_timeout: self.research.search_timeout_secs.map(Duration::from_secs),
            results_per_search: self.research.results_per_search,
        }
    }

    /// Mail transport for the `[email]` section, or one that rejects every send.
    pub fn transport(&self) -> Arc<dyn MailTransport> {
        match &self.email {
            Some(email) => match email.provider {
                EmailProvider::SendGrid => Arc::new(
                    SendGridTransport::from_env(&email.api_key_env, &email.from, &email.to)
                        .with_api_base(&email.api_base),
                ),
            },
            None => Arc::new(DisabledTransport),
        }
    }
}

fn validate_model(model: &str) -> Result<(), ConfigError> {
    if model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "llm.model must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_config() -> String {
        r#"
[research]
max_searches = 3
search_timeout_secs = 30

[llm]
type = "openai"
api_key_env = "TEST_RESEARCH_OPENAI_KEY"
api_base = "http://localhost:8080/v1"
model = "gpt-4o-mini"
temperature = 0.2

[email]
provider = "sendgrid"
from = "bot@example.com"
to = "me@example.com"

[logging]
level = "debug"
json = true
"#
        .to_string()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn test_parse_config() {
        let config: ResearchConfig =
            toml::from_str(&create_test_config()).expect("Failed to parse config");

        assert_eq!(config.research.max_searches, 3);
        assert_eq!(config.research.results_per_search, 5);
        assert!(config.research.web_search);
        assert_eq!(config.llm.temperature, Some(0.2));
        assert!(matches!(
            config.llm.provider,
            ProviderConfig::OpenAI { ref api_base, .. } if api_base == "http://localhost:8080/v1"
        ));

        let email = config.email.as_ref().expect("email section");
        assert_eq!(email.provider, EmailProvider::SendGrid);
        assert_eq!(email.api_key_env, "SENDGRID_API_KEY");
        assert_eq!(email.api_base, DEFAULT_SENDGRID_API_BASE);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config: ResearchConfig = toml::from_str(
            r#"
[llm]
type = "ollama"
model = "llama3.2"
"#,
        )
        .expect("Failed to parse config");

        assert_eq!(config.research.max_searches, 5);
        assert!(config.research.search_timeout_secs.is_none());
        assert!(config.email.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(matches!(
            config.llm.provider,
            ProviderConfig::Ollama { ref base_url, .. } if base_url == "http://localhost:11434"
        ));
        assert_eq!(config.transport().name(), "disabled");
        assert_eq!(config.settings(), ResearchSettings::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ResearchConfig::load("/definitely/not/here/research.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let file = write_config("[llm\ntype = ");
        assert!(matches!(
            ResearchConfig::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_ollama_provider_carries_sampling_params() {
        let config: ResearchConfig = toml::from_str(
            r#"
[llm]
type = "ollama"
model = "llama3.2:3b"
temperature = 0.7
max_tokens = 512
"#,
        )
        .expect("Failed to parse config");

        match config.to_provider().expect("provider") {
            Provider::Ollama { model, params, .. } => {
                assert_eq!(model, "llama3.2:3b");
                assert_eq!(
                    params,
                    ModelParams {
                        temperature: Some(0.7),
                        max_tokens: Some(512),
                    }
                );
            }
            other => panic!("expected ollama provider, got {:?}", other),
        }
    }

    #[cfg(feature = "openai")]
    #[test]
    fn test_load_requires_llm_key() {
        let file = write_config(
            r#"
[llm]
type = "openai"
api_key_env = "TEST_RESEARCH_KEY_THAT_IS_NEVER_SET"
model = "gpt-4o-mini"
"#,
        );
        match ResearchConfig::load(file.path()) {
            Err(ConfigError::MissingEnvVar(name)) => {
                assert_eq!(name, "TEST_RESEARCH_KEY_THAT_IS_NEVER_SET")
            }
            other => panic!("expected missing env var, got {:?}", other),
        }
    }

    #[cfg(feature = "openai")]
    #[test]
    fn test_load_and_resolve_openai() {
        // SAFETY: Tests are run single-threaded for env var safety
        unsafe {
            std::env::set_var("TEST_RESEARCH_OPENAI_KEY", "sk-test");
        }

        let file = write_config(&create_test_config());
        let config = ResearchConfig::load(file.path()).expect("Failed to load config");

        match config.to_provider().expect("provider") {
            Provider::OpenAI {
                api_key, params, ..
            } => {
                assert_eq!(api_key, "sk-test");
                assert_eq!(params.temperature, Some(0.2));
            }
            other => panic!("expected openai provider, got {:?}", other),
        }
        assert_eq!(
            config.settings().search_timeout,
            Some(Duration::from_secs(30))
        );
        assert_eq!(config.transport().name(), "sendgrid");
    }

    #[test]
    fn test_validation_rejects_zero_searches() {
        let config: ResearchConfig = toml::from_str(
            r#"
[research]
max_searches = 0

[llm]
type = "ollama"
model = "llama3.2"
"#,
        )
        .expect("Failed to parse config");

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_blank_recipient() {
        let config: ResearchConfig = toml::from_str(
            r#"
[llm]
type = "ollama"
model = "llama3.2"

[email]
from = "bot@example.com"
to = " "
"#,
        )
        .expect("Failed to parse config");

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
