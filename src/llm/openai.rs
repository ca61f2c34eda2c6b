use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_TIMEOUT_SECS: u64 = 90;

#[derive(Clone, Debug)]
pub struct OpenAiClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub default_temperature: f32,
    pub timeout: Duration,
}

impl Default for OpenAiClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenAiClientConfig {
    /// Reads OPENAI_API_KEY, OPENAI_BASE_URL, OPENAI_MODEL, OPENAI_TEMPERATURE, OPENAI_TIMEOUT_SECS.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") { cfg.base_url = base; }
        if let Ok(model) = std::env::var("OPENAI_MODEL") { cfg.default_model = model; }
        if let Some(t) = env_parse::<f32>("OPENAI_TEMPERATURE") { cfg.default_temperature = t; }
        if let Some(secs) = env_parse::<u64>("OPENAI_TIMEOUT_SECS") { cfg.timeout = Duration::from_secs(secs); }
        cfg
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    cfg: OpenAiClientConfig,
}

impl OpenAiClient {
    pub fn new(cfg: OpenAiClientConfig) -> Result<Self, OpenAiError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(OpenAiError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    fn api_key(&self) -> Result<&str, OpenAiError> {
        self.cfg.api_key.as_deref().ok_or(OpenAiError::MissingApiKey)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'))
    }

    fn build_api_request(&self, req: &ChatCompletionRequest) -> ApiChatCompletionRequest {
        ApiChatCompletionRequest {
            model: req.model.clone().unwrap_or_else(|| self.cfg.default_model.clone()),
            temperature: req.temperature.unwrap_or(self.cfg.default_temperature),
            max_tokens: req.max_tokens,
            messages: req
                .messages
                .iter()
                .map(|m| ApiChatMessage { role: m.role.as_api_str().to_string(), content: Some(m.content.clone()) })
                .collect(),
            response_format: req.response_format.as_ref().map(ResponseFormat::to_api),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse, OpenAiError>;
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse, OpenAiError> {
        if request.messages.is_empty() {
            return Err(OpenAiError::EmptyMessages);
        }
        let api_key = self.api_key()?;
        let api_request = self.build_api_request(&request);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(OpenAiError::from_reqwest)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(OpenAiError::from_reqwest)?;

        if !status.is_success() {
            let error = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .map(|env| env.error)
                .unwrap_or_default();
            return Err(OpenAiError::Api { status, error });
        }

        let parsed: ApiChatCompletionResponse = serde_json::from_slice(&bytes).map_err(OpenAiError::Decode)?;
        let choice = parsed.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let content = choice.and_then(|c| c.message.content).unwrap_or_default();

        Ok(ChatCompletionResponse {
            content,
            finish_reason,
            usage: parsed.usage.map(|u| UsageMetrics {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ChatCompletionRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub response_format: Option<ResponseFormat>,
}

/// Structured-output constraint for the reply.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseFormat {
    JsonSchema { name: String, schema: Value },
}

impl ResponseFormat {
    fn to_api(&self) -> Value {
        match self {
            ResponseFormat::JsonSchema { name, schema } => serde_json::json!({
                "type": "json_schema",
                "json_schema": { "name": name, "schema": schema, "strict": false }
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    fn as_api_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionResponse {
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageMetrics>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UsageMetrics {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug)]
pub enum OpenAiError {
    MissingApiKey,
    EmptyMessages,
    Http(reqwest::Error),
    Timeout,
    Api { status: StatusCode, error: ApiErrorBody },
    Decode(serde_json::Error),
    #[cfg(test)]
    MockQueueEmpty,
}

impl OpenAiError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { OpenAiError::Timeout } else { OpenAiError::Http(err) }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAiError::Timeout | OpenAiError::Http(_) => true,
            OpenAiError::Api { status, .. } => status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS,
            OpenAiError::MissingApiKey | OpenAiError::EmptyMessages | OpenAiError::Decode(_) => false,
            #[cfg(test)]
            OpenAiError::MockQueueEmpty => false,
        }
    }
}

impl std::fmt::Display for OpenAiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenAiError::MissingApiKey => write!(f, "OPENAI_API_KEY is not set"),
            OpenAiError::EmptyMessages => write!(f, "chat completion requires at least one message"),
            OpenAiError::Http(err) => write!(f, "http error: {err}"),
            OpenAiError::Timeout => write!(f, "request timed out"),
            OpenAiError::Api { status, error } => write!(f, "api error {status}: {}", error.message),
            OpenAiError::Decode(err) => write!(f, "decode error: {err}"),
            #[cfg(test)]
            OpenAiError::MockQueueEmpty => write!(f, "mock client response queue is empty"),
        }
    }
}

impl std::error::Error for OpenAiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OpenAiError::Http(err) => Some(err),
            OpenAiError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl Default for ApiErrorBody {
    fn default() -> Self {
        Self { message: "unknown error".to_string(), r#type: None, code: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
struct ApiChatCompletionRequest {
    model: String,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<ApiChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChatCompletionResponse {
    choices: Vec<ApiChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChatChoice {
    message: ApiChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays queued replies in order and records every request.
    #[derive(Debug, Default)]
    pub struct MockClient {
        responses: Mutex<VecDeque<Result<ChatCompletionResponse, OpenAiError>>>,
        calls: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl MockClient {
        pub fn new() -> Self { Self::default() }

        pub fn push_response(&self, resp: Result<ChatCompletionResponse, OpenAiError>) {
            self.responses.lock().unwrap().push_back(resp);
        }

        pub fn push_content(&self, content: impl Into<String>) {
            self.push_response(Ok(ChatCompletionResponse { content: content.into(), finish_reason: Some("stop".into()), usage: None }));
        }

        pub fn calls(&self) -> Vec<ChatCompletionRequest> { self.calls.lock().unwrap().clone() }
    }

    #[async_trait]
    impl LlmClient for MockClient {
        async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse, OpenAiError> {
            self.calls.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop_front().unwrap_or(Err(OpenAiError::MockQueueEmpty))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockClient;
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(OpenAiClientConfig {
            api_key: Some("test".into()),
            base_url: "http://localhost:9/v1/".into(),
            default_model: "gpt-4o-mini".into(),
            default_temperature: 0.1,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn sample_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: vec![
                ChatMessage::new(ChatRole::System, "You extract recipes."),
                ChatMessage::new(ChatRole::User, "Pancakes: flour, eggs"),
            ],
            max_tokens: Some(256),
            response_format: Some(ResponseFormat::JsonSchema {
                name: "recipe".into(),
                schema: serde_json::json!({ "type": "object" }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn build_request_serializes_messages_and_schema() {
        let c = client();
        let value = serde_json::to_value(c.build_api_request(&sample_request())).unwrap();

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Pancakes: flour, eggs");
        assert_eq!(value["max_tokens"], 256);
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(value["response_format"]["json_schema"]["name"], "recipe");
        assert_eq!(value["response_format"]["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(client().endpoint(), "http://localhost:9/v1/chat/completions");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let c = OpenAiClient::new(OpenAiClientConfig::default()).unwrap();
        let err = c.chat_completion(sample_request()).await.unwrap_err();
        assert!(matches!(err, OpenAiError::MissingApiKey));
    }

    #[tokio::test]
    async fn mock_client_replays_queue() {
        let mock = MockClient::new();
        mock.push_content("{}");
        let out = mock.chat_completion(sample_request()).await.unwrap();
        assert_eq!(out.content, "{}");
        assert_eq!(mock.calls().len(), 1);
        assert!(matches!(mock.chat_completion(sample_request()).await, Err(OpenAiError::MockQueueEmpty)));
    }

    #[test]
    fn api_error_display_includes_status() {
        let err = OpenAiError::Api {
            status: StatusCode::BAD_REQUEST,
            error: ApiErrorBody { message: "bad request".into(), r#type: Some("invalid_request_error".into()), code: None },
        };
        assert_eq!(format!("{err}"), "api error 400 Bad Request: bad request");
        assert!(!err.is_retryable());
        let busy = OpenAiError::Api { status: StatusCode::TOO_MANY_REQUESTS, error: ApiErrorBody::default() };
        assert!(busy.is_retryable());
    }
}
