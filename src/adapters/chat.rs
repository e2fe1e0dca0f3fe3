use crate::config::toml_config::{GeneratorConfig, VisionConfig};
use crate::config::ApiKeys;
use crate::domain::model::{ChatMessage, ChatRequest};
use crate::domain::ports::ChatCompletion;
use crate::utils::error::{Result, SolverError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for any OpenAI-compatible `/chat/completions` endpoint (Groq and
/// Together AI both speak it).
#[derive(Clone)]
pub struct OpenAiChatClient {
    service: &'static str,
    credential_env: &'static str,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(
        service: &'static str,
        credential_env: &'static str,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));

        if api_key.is_none() {
            tracing::warn!(
                "{} not set; {} requests will be rejected",
                credential_env,
                service
            );
        }

        Ok(Self {
            service,
            credential_env,
            endpoint,
            model: model.to_string(),
            api_key,
            client,
        })
    }

    /// Text generation client (Groq).
    pub fn groq(config: &GeneratorConfig, keys: &ApiKeys) -> Result<Self> {
        Self::new(
            "Groq",
            ApiKeys::GROQ_ENV,
            &config.base_url,
            &config.model,
            keys.groq.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Vision client (Together AI).
    pub fn together(config: &VisionConfig, keys: &ApiKeys) -> Result<Self> {
        Self::new(
            "Together AI",
            ApiKeys::TOGETHER_ENV,
            &config.base_url,
            &config.model,
            keys.together.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn service_name(&self) -> &'static str {
        self.service
    }

    fn credential_env(&self) -> &'static str {
        self.credential_env
    }

    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SolverError::ClientNotConfigured {
                service: self.service,
                env_var: self.credential_env,
            })?;

        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!("Making {} request to: {}", self.service, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("{} response status: {}", self.service, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SolverError::ApiStatus {
                service: self.service,
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        let parsed: CompletionResponse =
            serde_json::from_str(&raw).map_err(|e| SolverError::MalformedResponse {
                message: format!("{}: {}", self.service, e),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SolverError::MalformedResponse {
                message: format!("{} returned no message content", self.service),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer, api_key: Option<&str>) -> OpenAiChatClient {
        OpenAiChatClient::new(
            "Groq",
            "GROQ_API_KEY",
            &server.url("/openai/v1/"),
            "llama-3.3-70b-versatile",
            api_key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::system("tutor"), ChatMessage::user("1 + 1")],
            temperature: 0.2,
            max_tokens: 4000,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_openai_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/openai/v1/chat/completions")
                .header("authorization", "Bearer gsk_test")
                .json_body(serde_json::json!({
                    "model": "llama-3.3-70b-versatile",
                    "messages": [
                        {"role": "system", "content": "tutor"},
                        {"role": "user", "content": "1 + 1"}
                    ],
                    "temperature": 0.2,
                    "max_tokens": 4000
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "2"}}]
                }));
        });

        let chat = client(&server, Some("gsk_test"));
        assert_eq!(chat.endpoint(), server.url("/openai/v1/chat/completions"));

        let text = chat.complete(request()).await.unwrap();

        api_mock.assert();
        assert_eq!(text, "2");
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200);
        });

        let chat = client(&server, None);
        assert!(!chat.is_configured());

        let err = chat.complete(request()).await.unwrap_err();
        assert!(matches!(err, SolverError::ClientNotConfigured { .. }));
        api_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/openai/v1/chat/completions");
            then.status(429).body("rate limit exceeded");
        });

        let err = client(&server, Some("k")).complete(request()).await.unwrap_err();
        match err {
            SolverError::ApiStatus {
                service,
                status,
                body,
            } => {
                assert_eq!(service, "Groq");
                assert_eq!(status, 429);
                assert_eq!(body, "rate limit exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/openai/v1/chat/completions");
            then.status(200).json_body(serde_json::json!({"choices": []}));
        });

        let err = client(&server, Some("k")).complete(request()).await.unwrap_err();
        assert!(matches!(err, SolverError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/openai/v1/chat/completions");
            then.status(200).body("<html>gateway</html>");
        });

        let err = client(&server, Some("k")).complete(request()).await.unwrap_err();
        assert!(matches!(err, SolverError::MalformedResponse { .. }));
        assert_eq!(
            err.category(),
            crate::utils::error::ErrorCategory::ExternalService
        );
    }

    #[test]
    fn test_named_constructors() {
        let keys = ApiKeys {
            groq: Some("g".to_string()),
            together: None,
        };
        let groq = OpenAiChatClient::groq(&GeneratorConfig::default(), &keys).unwrap();
        assert!(groq.is_configured());
        assert_eq!(groq.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(groq.credential_env(), "GROQ_API_KEY");

        let together = OpenAiChatClient::together(&VisionConfig::default(), &keys).unwrap();
        assert!(!together.is_configured());
        assert_eq!(together.service_name(), "Together AI");
        assert_eq!(
            together.model(),
            "meta-llama/Llama-3.2-11B-Vision-Instruct-Turbo"
        );
    }
}
