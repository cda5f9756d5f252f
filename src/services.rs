//! HTTP-backed text services and speech recognition.
//!
//! Each client is optional. [`Services::from_config`] builds the ones whose
//! credentials are present; the bot answers "not configured" for the rest.

use crate::config::{Credentials, ServicesConfig};
use derive_more::{Display, Error};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Service error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Service error: {} at {}:{}", message, file, line)]
pub struct ServiceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ServiceError {
    /// Creates a new service error with caller location tracking.
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

impl From<reqwest::Error> for ServiceError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP error: {}", err))
    }
}

/// A service that answers a piece of text.
#[async_trait::async_trait]
pub trait TextService: Send + Sync {
    /// Answer for `input`, `None` when the service has nothing to say.
    async fn call(&self, input: &str) -> Result<Option<String>, ServiceError>;
}

/// Speech to text.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Text spoken in `audio`.
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ServiceError>;
}

fn client(config: &ServicesConfig) -> Result<reqwest::Client, ServiceError> {
    Ok(reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(concat!("chatplay/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[track_caller]
fn service_url(base: &str, params: &[(&str, &str)]) -> Result<Url, ServiceError> {
    Url::parse_with_params(base, params)
        .map_err(|e| ServiceError::new(format!("Invalid service URL {base}: {e}")))
}

async fn failed(service: &str, response: reqwest::Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!(service, %status, body = %body, "Service answered with an error");
    ServiceError::new(format!("{service} answered with status {status}"))
}

/// Math solver backed by the Wolfram Alpha short answers API.
#[derive(Debug, Clone)]
pub struct WolframSolver {
    client: reqwest::Client,
    url: String,
    app_id: String,
}

impl WolframSolver {
    /// Creates a solver.
    #[instrument(skip(config, app_id))]
    pub fn new(config: &ServicesConfig, app_id: String) -> Result<Self, ServiceError> {
        info!(url = %config.solver_url(), "Creating solver client");
        Ok(Self {
            client: client(config)?,
            url: config.solver_url().clone(),
            app_id,
        })
    }
}

#[async_trait::async_trait]
impl TextService for WolframSolver {
    #[instrument(skip(self))]
    async fn call(&self, input: &str) -> Result<Option<String>, ServiceError> {
        let url = service_url(&self.url, &[("appid", self.app_id.as_str()), ("i", input)])?;
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_IMPLEMENTED => {
                debug!("Solver has no answer");
                Ok(None)
            }
            status if status.is_success() => {
                let answer = response.text().await?;
                debug!(answer_length = answer.len(), "Solver answered");
                Ok(Some(answer.trim().to_string()).filter(|a| !a.is_empty()))
            }
            _ => Err(failed("Solver", response).await),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JokeSearch {
    #[serde(default)]
    results: Vec<Joke>,
}

#[derive(Debug, Deserialize)]
struct Joke {
    joke: String,
}

/// Joke search backed by icanhazdadjoke.
#[derive(Debug, Clone)]
pub struct JokeClient {
    client: reqwest::Client,
    url: String,
}

impl JokeClient {
    /// Creates a joke client. Needs no credentials.
    #[instrument(skip(config))]
    pub fn new(config: &ServicesConfig) -> Result<Self, ServiceError> {
        info!(url = %config.joke_url(), "Creating joke client");
        Ok(Self {
            client: client(config)?,
            url: config.joke_url().clone(),
        })
    }
}

/// Last word of a joke request, used as the search term.
///
/// "tell me a joke about cats" searches for "cats".
pub fn joke_term(text: &str) -> &str {
    text.split_whitespace()
        .last()
        .filter(|word| !word.eq_ignore_ascii_case("joke"))
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl TextService for JokeClient {
    #[instrument(skip(self))]
    async fn call(&self, input: &str) -> Result<Option<String>, ServiceError> {
        let url = service_url(&self.url, &[("term", joke_term(input)), ("limit", "1")])?;
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failed("Joke search", response).await);
        }
        let search: JokeSearch = response.json().await?;
        debug!(found = search.results.len(), "Joke search finished");
        Ok(search.results.into_iter().next().map(|j| j.joke))
    }
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(default)]
    text: Vec<String>,
}

/// Translator backed by Yandex Translate.
#[derive(Debug, Clone)]
pub struct YandexTranslator {
    client: reqwest::Client,
    url: String,
    key: String,
    lang: String,
}

impl YandexTranslator {
    /// Creates a translator for the configured direction.
    #[instrument(skip(config, key))]
    pub fn new(config: &ServicesConfig, key: String) -> Result<Self, ServiceError> {
        info!(url = %config.translate_url(), lang = %config.translate_lang(), "Creating translator");
        Ok(Self {
            client: client(config)?,
            url: config.translate_url().clone(),
            key,
            lang: config.translate_lang().clone(),
        })
    }
}

#[async_trait::async_trait]
impl TextService for YandexTranslator {
    #[instrument(skip(self))]
    async fn call(&self, input: &str) -> Result<Option<String>, ServiceError> {
        let url = service_url(
            &self.url,
            &[
                ("key", self.key.as_str()),
                ("text", input),
                ("lang", self.lang.as_str()),
            ],
        )?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(failed("Translator", response).await);
        }
        let translation: Translation = response.json().await?;
        let text = translation.text.join(" ");
        Ok((!text.trim().is_empty()).then_some(text))
    }
}

#[derive(Debug, Deserialize)]
struct Recognition {
    text: Option<String>,
    #[serde(rename = "_text")]
    legacy_text: Option<String>,
}

/// Speech recognition backed by Wit.ai.
#[derive(Debug, Clone)]
pub struct WitTranscriber {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl WitTranscriber {
    /// Creates a transcriber.
    #[instrument(skip(config, token))]
    pub fn new(config: &ServicesConfig, token: String) -> Result<Self, ServiceError> {
        info!(url = %config.speech_url(), "Creating speech client");
        Ok(Self {
            client: client(config)?,
            url: config.speech_url().clone(),
            token,
        })
    }
}

#[async_trait::async_trait]
impl Transcriber for WitTranscriber {
    #[instrument(skip(self, audio), fields(audio_len = audio.len()))]
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header("Content-Type", "audio/ogg")
            .body(audio)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failed("Speech recognition", response).await);
        }
        let recognition: Recognition = response.json().await?;
        recognition
            .text
            .or(recognition.legacy_text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServiceError::new("Could not recognise any speech"))
    }
}

/// The optional services a bot can call.
#[derive(Clone, Default)]
pub struct Services {
    solver: Option<Arc<dyn TextService>>,
    jokes: Option<Arc<dyn TextService>>,
    translator: Option<Arc<dyn TextService>>,
    transcriber: Option<Arc<dyn Transcriber>>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("solver", &self.solver.is_some())
            .field("jokes", &self.jokes.is_some())
            .field("translator", &self.translator.is_some())
            .field("transcriber", &self.transcriber.is_some())
            .finish()
    }
}

impl Services {
    /// No services at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds every service whose credentials are present.
    #[instrument(skip_all)]
    pub fn from_config(
        config: &ServicesConfig,
        credentials: &Credentials,
    ) -> Result<Self, ServiceError> {
        let mut services = Self::none().with_jokes(Arc::new(JokeClient::new(config)?));
        if let Some(app_id) = credentials.wolfram_app_id() {
            services = services.with_solver(Arc::new(WolframSolver::new(config, app_id.clone())?));
        }
        if let Some(key) = credentials.yandex_translate_key() {
            services =
                services.with_translator(Arc::new(YandexTranslator::new(config, key.clone())?));
        }
        if let Some(token) = credentials.wit_ai_token() {
            services =
                services.with_transcriber(Arc::new(WitTranscriber::new(config, token.clone())?));
        }
        info!(services = ?services, "Services ready");
        Ok(services)
    }

    /// Sets the solver.
    pub fn with_solver(mut self, solver: Arc<dyn TextService>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Sets the joke search.
    pub fn with_jokes(mut self, jokes: Arc<dyn TextService>) -> Self {
        self.jokes = Some(jokes);
        self
    }

    /// Sets the translator.
    pub fn with_translator(mut self, translator: Arc<dyn TextService>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Sets the transcriber.
    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Solver, if configured.
    pub fn solver(&self) -> Option<&dyn TextService> {
        self.solver.as_deref()
    }

    /// Joke search, if configured.
    pub fn jokes(&self) -> Option<&dyn TextService> {
        self.jokes.as_deref()
    }

    /// Translator, if configured.
    pub fn translator(&self) -> Option<&dyn TextService> {
        self.translator.as_deref()
    }

    /// Transcriber, if configured.
    pub fn transcriber(&self) -> Option<&dyn Transcriber> {
        self.transcriber.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joke_term_is_last_word() {
        assert_eq!(joke_term("tell me a joke about cats"), "cats");
        assert_eq!(joke_term("tell me a joke"), "");
        assert_eq!(joke_term(""), "");
    }

    #[test]
    fn test_recognition_accepts_legacy_field() {
        let r: Recognition = serde_json::from_str(r#"{"_text": "play matches"}"#).unwrap();
        assert_eq!(r.text.or(r.legacy_text).as_deref(), Some("play matches"));
    }

    #[test]
    fn test_from_config_without_credentials_only_has_jokes() {
        let services =
            Services::from_config(&ServicesConfig::default(), &Credentials::default()).unwrap();
        assert!(services.jokes().is_some());
        assert!(services.solver().is_none());
        assert!(services.translator().is_none());
        assert!(services.transcriber().is_none());
    }
}
