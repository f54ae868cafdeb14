use crate::config::{EvaluationConfig, Provider};
use crate::error::{ConfigError, RemoteCallError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Send one system + user exchange, receive the reply text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, RemoteCallError>;

    fn provider(&self) -> Provider;
}

/// Builds the client for a provider. Each provider has its own construction
/// path; `connect` picks one by tag.
pub trait ClientFactory: Send + Sync {
    fn openai(&self, config: &EvaluationConfig) -> Result<Box<dyn ChatClient>, ConfigError>;

    fn groq(&self, config: &EvaluationConfig) -> Result<Box<dyn ChatClient>, ConfigError>;

    fn connect(&self, config: &EvaluationConfig) -> Result<Box<dyn ChatClient>, ConfigError> {
        match config.provider {
            Provider::OpenAi => self.openai(config),
            Provider::Groq => self.groq(config),
        }
    }
}

/// Production factory: both providers speak the chat completions API and
/// differ only in base URL and credential.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn openai(&self, config: &EvaluationConfig) -> Result<Box<dyn ChatClient>, ConfigError> {
        Ok(Box::new(ChatCompletionsClient::new(
            Provider::OpenAi,
            Provider::OpenAi.base_url(),
            config,
        )?))
    }

    fn groq(&self, config: &EvaluationConfig) -> Result<Box<dyn ChatClient>, ConfigError> {
        Ok(Box::new(ChatCompletionsClient::new(
            Provider::Groq,
            Provider::Groq.base_url(),
            config,
        )?))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client bound to one config.
pub struct ChatCompletionsClient {
    provider: Provider,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    api_key: String,
    http: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        provider: Provider,
        base_url: &str,
        config: &EvaluationConfig,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docujudge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Client {
                provider: provider.display_name(),
                message: e.to_string(),
            })?;

        Ok(Self {
            provider,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key: config.api_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl ChatClient for ChatCompletionsClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, RemoteCallError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            provider = self.provider.id(),
            model = %self.model,
            endpoint = %self.endpoint,
            "sending chat completion request"
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteCallError::Api {
                provider: self.provider.display_name(),
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&raw).map_err(|e| {
            RemoteCallError::ResponseFormat(format!("{}. Raw response: {}", e, raw))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RemoteCallError::ResponseFormat("No response choices received".into()))
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}
