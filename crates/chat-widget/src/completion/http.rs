use std::env;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::gateway::{CompletionError, CompletionFuture, CompletionGateway, CompletionRequest};

const DEFAULT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_BACKOFF_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct HttpCompletionConfig {
    pub chat_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_backoff_ms: u64,
}

impl HttpCompletionConfig {
    pub fn from_env() -> Result<Self, CompletionConfigError> {
        let chat_url = require_non_empty_env("ALETHEIA_CHAT_URL")?;
        if !chat_url.starts_with("http://") && !chat_url.starts_with("https://") {
            return Err(CompletionConfigError::InvalidConfiguration(
                "ALETHEIA_CHAT_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            chat_url,
            api_key: optional_trimmed_env("ALETHEIA_API_KEY"),
            timeout_ms: parse_u64_env("ALETHEIA_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            max_retries: parse_u32_env("ALETHEIA_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_backoff_ms: parse_u64_env(
                "ALETHEIA_RETRY_BASE_BACKOFF_MS",
                DEFAULT_RETRY_BASE_BACKOFF_MS,
            )?,
        })
    }
}

#[derive(Debug, Error)]
pub enum CompletionConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {key}: {value}")]
    ParseInt { key: String, value: String },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build completion http client: {0}")]
    HttpClient(String),
}

/// Completion endpoint client over HTTP.
///
/// Transient failures (timeouts, 408/429/5xx) are retried with exponential
/// backoff before the failure surfaces; the submission state machine only
/// ever sees the final outcome.
#[derive(Clone)]
pub struct HttpCompletionGateway {
    client: reqwest::Client,
    config: HttpCompletionConfig,
}

impl HttpCompletionGateway {
    pub fn new(config: HttpCompletionConfig) -> Result<Self, CompletionConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| CompletionConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn complete_with_retries(
        &self,
        request: &CompletionRequest,
    ) -> Result<String, CompletionError> {
        let mut attempt = 0_u32;

        loop {
            match self.send_once(request).await {
                Ok(raw) => return Ok(raw),
                Err(err) => {
                    if err.retryable && attempt < self.config.max_retries {
                        let backoff_multiplier = 2_u64.saturating_pow(attempt);
                        let backoff_ms = self
                            .config
                            .retry_base_backoff_ms
                            .saturating_mul(backoff_multiplier);
                        warn!(
                            attempt,
                            backoff_ms, "completion attempt failed, retrying: {}", err.error
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                        attempt = attempt.saturating_add(1);
                        continue;
                    }

                    return Err(err.error);
                }
            }
        }
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, SendAttemptError> {
        debug!(
            message_count = request.messages.len(),
            "sending completion request"
        );

        let mut http_request = self
            .client
            .post(&self.config.chat_url)
            .json(&json!({ "messages": request.messages }));
        if let Some(api_key) = self.config.api_key.as_deref() {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(|err| {
            if err.is_timeout() {
                SendAttemptError::retryable(CompletionError::Timeout)
            } else {
                SendAttemptError::retryable(CompletionError::ProviderFailure(
                    "request_unavailable".to_string(),
                ))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|_| {
            SendAttemptError::non_retryable(CompletionError::InvalidPayload(
                "response_body_read_failed".to_string(),
            ))
        })?;

        if !status.is_success() {
            let provider_code = parse_provider_error_code(&body);
            let error = CompletionError::ProviderFailure(format!(
                "status={} code={provider_code}",
                status.as_u16()
            ));
            return Err(if is_retryable_status(status) {
                SendAttemptError::retryable(error)
            } else {
                SendAttemptError::non_retryable(error)
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|_| {
            SendAttemptError::non_retryable(CompletionError::InvalidPayload(
                "response_json_parse_failed".to_string(),
            ))
        })?;

        let content = &parsed
            .choices
            .first()
            .ok_or_else(|| {
                SendAttemptError::non_retryable(CompletionError::InvalidPayload(
                    "missing_choice".to_string(),
                ))
            })?
            .message
            .content;

        match content {
            Value::String(raw) => Ok(raw.clone()),
            _ => Err(SendAttemptError::non_retryable(
                CompletionError::InvalidPayload("content_not_text".to_string()),
            )),
        }
    }
}

impl CompletionGateway for HttpCompletionGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move { self.complete_with_retries(&request).await })
    }
}

#[derive(Debug)]
struct SendAttemptError {
    error: CompletionError,
    retryable: bool,
}

impl SendAttemptError {
    fn retryable(error: CompletionError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    fn non_retryable(error: CompletionError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Value,
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<Value>,
    }

    let Some(provider_error) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match provider_error {
        Value::String(code) => code,
        Value::Object(details) => details
            .get("code")
            .or_else(|| details.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        _ => "unknown".to_string(),
    }
}

fn require_non_empty_env(key: &str) -> Result<String, CompletionConfigError> {
    let value =
        env::var(key).map_err(|_| CompletionConfigError::MissingVar(key.to_string()))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CompletionConfigError::MissingVar(key.to_string()));
    }
    Ok(trimmed.to_string())
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64, CompletionConfigError> {
    match optional_trimmed_env(key) {
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| CompletionConfigError::ParseInt {
                key: key.to_string(),
                value,
            }),
        None => Ok(default),
    }
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32, CompletionConfigError> {
    match optional_trimmed_env(key) {
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| CompletionConfigError::ParseInt {
                key: key.to_string(),
                value,
            }),
        None => Ok(default),
    }
}

fn optional_trimmed_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
