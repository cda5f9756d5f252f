//! Bot configuration.
//!
//! Non-secret settings come from an optional TOML file; API credentials come
//! from the environment (a `.env` file is honoured by `main`).

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable holding the Wolfram Alpha app id.
pub const WOLFRAM_APP_ID: &str = "WOLFRAM_APP_ID";
/// Environment variable holding the Yandex Translate key.
pub const YANDEX_TRANSLATE_KEY: &str = "YANDEX_TRANSLATE_KEY";
/// Environment variable holding the Wit.ai server token.
pub const WIT_AI_TOKEN: &str = "WIT_AI_TOKEN";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct BotConfig {
    /// HTTP ingestion server.
    #[serde(default)]
    http: HttpConfig,

    /// Outbound text and speech services.
    #[serde(default)]
    services: ServicesConfig,

    /// Where replies go in HTTP mode.
    #[serde(default)]
    messenger: MessengerConfig,

    /// Matches on the table when a matches game starts.
    #[serde(default = "default_initial_matches")]
    #[getter(skip)]
    initial_matches: u32,
}

fn default_initial_matches() -> u32 {
    chatplay_games::DEFAULT_MATCHES
}

impl BotConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.initial_matches == 0 {
            return Err(ConfigError::new("initial_matches must be at least 1"));
        }

        info!(
            host = %config.http.host,
            port = config.http.port,
            initial_matches = config.initial_matches,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self {
                    initial_matches: default_initial_matches(),
                    ..Self::default()
                })
            }
        }
    }

    /// Matches on the table when a matches game starts.
    pub fn initial_matches(&self) -> u32 {
        match self.initial_matches {
            0 => default_initial_matches(),
            n => n,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Endpoints and limits for the outbound services.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Wolfram Alpha short answers endpoint.
    #[serde(default = "default_solver_url")]
    solver_url: String,

    /// Joke search endpoint.
    #[serde(default = "default_joke_url")]
    joke_url: String,

    /// Translation endpoint.
    #[serde(default = "default_translate_url")]
    translate_url: String,

    /// Translation direction, e.g. "en-ru".
    #[serde(default = "default_translate_lang")]
    translate_lang: String,

    /// Speech recognition endpoint.
    #[serde(default = "default_speech_url")]
    speech_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_solver_url() -> String {
    "https://api.wolframalpha.com/v1/result".to_string()
}

fn default_joke_url() -> String {
    "https://icanhazdadjoke.com/search".to_string()
}

fn default_translate_url() -> String {
    "https://translate.yandex.net/api/v1.5/tr.json/translate".to_string()
}

fn default_translate_lang() -> String {
    "en-ru".to_string()
}

fn default_speech_url() -> String {
    "https://api.wit.ai/speech".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            solver_url: default_solver_url(),
            joke_url: default_joke_url(),
            translate_url: default_translate_url(),
            translate_lang: default_translate_lang(),
            speech_url: default_speech_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServicesConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Reply delivery in HTTP mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MessengerConfig {
    /// Instructions are also posted here when set.
    #[serde(default)]
    webhook_url: Option<String>,
}

/// API credentials. A missing credential disables its feature.
#[derive(Debug, Clone, Default, Getters)]
pub struct Credentials {
    /// Wolfram Alpha app id.
    wolfram_app_id: Option<String>,
    /// Yandex Translate key.
    yandex_translate_key: Option<String>,
    /// Wit.ai server token.
    wit_ai_token: Option<String>,
}

impl Credentials {
    /// Reads credentials from the process environment.
    #[instrument]
    pub fn from_env() -> Self {
        let credentials = Self {
            wolfram_app_id: env_var(WOLFRAM_APP_ID),
            yandex_translate_key: env_var(YANDEX_TRANSLATE_KEY),
            wit_ai_token: env_var(WIT_AI_TOKEN),
        };
        info!(
            solver = credentials.wolfram_app_id.is_some(),
            translator = credentials.yandex_translate_key.is_some(),
            speech = credentials.wit_ai_token.is_some(),
            "Credentials loaded"
        );
        credentials
    }

    /// Credentials from explicit values.
    pub fn new(
        wolfram_app_id: Option<String>,
        yandex_translate_key: Option<String>,
        wit_ai_token: Option<String>,
    ) -> Self {
        Self {
            wolfram_app_id,
            yandex_translate_key,
            wit_ai_token,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            warn!(variable = name, "Credential not set, feature disabled");
            None
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
