//! Application configuration.
//!
//! Values come from the process environment after an explicit `.env`
//! discovery. Nothing is read at import time; call [`AppConfig::load`] once
//! at startup and pass the result to the services.

use config::{Config, ConfigError, Environment};
use edusense_provider::gemini::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use edusense_provider::{AzureCredentials, OpenAiSettings, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Locations searched for a `.env` file, first hit wins
pub const DOTENV_SEARCH_PATHS: [&str; 5] = [
    ".env",
    "../.env",
    "../../.env",
    "../../../.env",
    "../streamlit-app/.env",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Generator requested for the tutor: `gemini`, `openai` or `mock`
    pub llm_service: String,
    pub gemini: GeminiConfig,
    pub openai: OpenAiSettings,
    pub text_analytics: AzureCredentials,
    pub face: AzureCredentials,
    pub personalizer: AzureCredentials,
    pub communication: AzureCredentials,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
    /// The `.env` file that was loaded, if any
    pub dotenv_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_service: "gemini".to_string(),
            gemini: GeminiConfig::default(),
            openai: OpenAiSettings::default(),
            text_analytics: AzureCredentials::default(),
            face: AzureCredentials::default(),
            personalizer: AzureCredentials::default(),
            communication: AzureCredentials::default(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
            dotenv_path: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 200,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Flat view of the environment variables the application reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvSettings {
    llm_service: Option<String>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    gemini_base_url: Option<String>,
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
    openai_model: Option<String>,
    text_analytics_endpoint: Option<String>,
    text_analytics_key: Option<String>,
    face_api_endpoint: Option<String>,
    face_api_key: Option<String>,
    personalizer_endpoint: Option<String>,
    personalizer_key: Option<String>,
    communication_endpoint: Option<String>,
    communication_key: Option<String>,
    http_timeout_secs: Option<u64>,
    llm_max_retries: Option<u32>,
    llm_retry_delay_ms: Option<u64>,
    log_level: Option<String>,
    log_format: Option<LogFormat>,
}

impl AppConfig {
    /// Load `.env` (if found) and build the configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let dotenv_path = load_dotenv(Path::new("."));
        let mut config = Self::from_environment(Environment::default())?;
        config.dotenv_path = dotenv_path;
        Ok(config)
    }

    /// Build from an explicit set of variables instead of the process
    /// environment. Keys use the environment names, e.g. `GEMINI_API_KEY`.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let settings: EnvSettings = Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(Self::from_settings(settings))
    }

    fn from_settings(env: EnvSettings) -> Self {
        let defaults = Self::default();
        let http = HttpConfig {
            timeout_secs: env.http_timeout_secs.unwrap_or(defaults.http.timeout_secs),
        };

        let gemini = GeminiConfig {
            api_key: non_empty(env.gemini_api_key),
            base_url: non_empty(env.gemini_base_url)
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            model: non_empty(env.gemini_model).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            timeout_secs: http.timeout_secs,
            ..GeminiConfig::default()
        };

        let openai = OpenAiSettings {
            api_key: non_empty(env.openai_api_key),
            api_base: non_empty(env.openai_api_base),
            model: non_empty(env.openai_model).unwrap_or(defaults.openai.model),
        };

        Self {
            llm_service: non_empty(env.llm_service)
                .map(|s| s.to_lowercase())
                .unwrap_or(defaults.llm_service),
            gemini,
            openai,
            text_analytics: credentials(env.text_analytics_endpoint, env.text_analytics_key),
            face: credentials(env.face_api_endpoint, env.face_api_key),
            personalizer: credentials(env.personalizer_endpoint, env.personalizer_key),
            communication: credentials(env.communication_endpoint, env.communication_key),
            http,
            retry: RetryConfig {
                max_retries: env.llm_max_retries.unwrap_or(defaults.retry.max_retries),
                initial_delay_ms: env
                    .llm_retry_delay_ms
                    .unwrap_or(defaults.retry.initial_delay_ms),
            },
            logging: LoggingConfig {
                level: non_empty(env.log_level).unwrap_or(defaults.logging.level),
                format: env.log_format.unwrap_or_default(),
            },
            dotenv_path: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn credentials(endpoint: Option<String>, key: Option<String>) -> AzureCredentials {
    AzureCredentials {
        endpoint: non_empty(endpoint),
        key: non_empty(key),
    }
}

/// Find the first `.env` relative to `base` and load it into the process
/// environment. Existing variables are not overridden.
pub fn load_dotenv(base: &Path) -> Option<PathBuf> {
    let path = find_dotenv(base)?;
    match dotenvy::from_path(&path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load .env file");
            None
        }
    }
}

/// First existing `.env` candidate relative to `base`
pub fn find_dotenv(base: &Path) -> Option<PathBuf> {
    DOTENV_SEARCH_PATHS
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|path| path.is_file())
}
