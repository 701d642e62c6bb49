//! OpenAI-compatible chat completion client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatTurn, CompletionProvider};
use crate::config::Settings;
use crate::error::CompletionError;

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
}

/// One message as the wire protocol spells it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl From<&ChatTurn> for WireMessage {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.as_str().to_owned(),
            content: turn.content.clone(),
        }
    }
}

/// Chat completion response body.
#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error response envelope.
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

/// Error details inside an error response.
#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
    code: Option<String>,
}

/// OpenAI-compatible chat completion client.
///
/// Holds the configured credentials, endpoint, and model; no state is
/// retained between calls beyond the pooled HTTP connection.
#[derive(Debug, Clone)]
pub struct OpenAI {
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OpenAI {
    /// Default sampling temperature.
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    /// Request timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Fails if the API key is empty or the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(CompletionError::auth("openai", "API key is required"));
        }

        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            api_base: api_base.into(),
            model: model.into(),
            temperature: Self::DEFAULT_TEMPERATURE,
            client,
        })
    }

    /// Create a client from loaded settings.
    ///
    /// # Errors
    ///
    /// Fails if the settings carry an empty API key.
    pub fn from_settings(settings: &Settings) -> Result<Self, CompletionError> {
        Self::new(
            &settings.openai_api_key,
            &settings.openai_api_base,
            &settings.openai_model,
        )
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Get the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the chat completions URL.
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    /// Build request headers for JSON requests.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    /// Build the request body from the conversation.
    fn build_body(&self, turns: &[ChatTurn]) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: turns.iter().map(WireMessage::from).collect(),
            temperature: self.temperature,
        }
    }

    /// Extract the first choice's text content.
    fn parse_response(response: ChatCompletionResponse) -> Result<String, CompletionError> {
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            CompletionError::response_format("at least one choice", "empty choices")
        })?;

        choice.message.content.ok_or_else(|| {
            CompletionError::response_format("text content in first choice", "no content")
        })
    }

    /// Parse an error response body.
    fn parse_error(status: u16, body: &str) -> CompletionError {
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(body) {
            let error = error_response.error;
            let code = error.code.unwrap_or_else(|| error.error_type.clone());

            return match status {
                401 => CompletionError::auth("openai", error.message),
                429 => CompletionError::rate_limited("openai"),
                _ => CompletionError::provider_code("openai", code, error.message),
            };
        }

        CompletionError::http_status(status, body.to_owned())
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, CompletionError> {
        if turns.is_empty() {
            return Err(CompletionError::response_format(
                "non-empty conversation",
                "empty history",
            ));
        }

        let url = self.chat_url();
        let body = self.build_body(turns);

        tracing::debug!(model = %self.model, turns = turns.len(), "requesting completion");

        let response = self.build_request(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text));
        }

        let response_text = response.text().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                CompletionError::response_format(
                    "valid chat completion response",
                    format!("parse error: {e}, response: {response_text}"),
                )
            })?;

        Self::parse_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn test_client() -> OpenAI {
        OpenAI::new("test-key", "https://api.openai.com/v1", "gpt-5").unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn rejects_empty_api_key() {
            let result = OpenAI::new("", "https://api.openai.com/v1", "gpt-5");
            assert!(matches!(result, Err(CompletionError::Auth { .. })));
        }

        #[test]
        fn from_settings_carries_fields() {
            let settings = crate::config::Settings::new("k").with_model("gpt-5-mini");
            let client = OpenAI::from_settings(&settings).unwrap();
            assert_eq!(client.model(), "gpt-5-mini");
        }
    }

    mod request_body {
        use super::*;

        #[test]
        fn preserves_full_history_in_order() {
            let client = test_client();
            let turns = vec![
                ChatTurn::system("be brief"),
                ChatTurn::user("hello"),
                ChatTurn::assistant("hi"),
                ChatTurn::user("how are you?"),
            ];

            let body = client.build_body(&turns);

            assert_eq!(body.messages.len(), 4);
            assert_eq!(body.messages[0].role, "system");
            assert_eq!(body.messages[1].content, "hello");
            assert_eq!(body.messages[2].role, "assistant");
            assert_eq!(body.messages[3].content, "how are you?");
        }

        #[test]
        fn serializes_expected_shape() {
            let client = test_client().with_temperature(0.2);
            let body = client.build_body(&[ChatTurn::user("hi")]);
            let json = serde_json::to_value(&body).unwrap();

            assert_eq!(json["model"], "gpt-5");
            assert_eq!(json["messages"][0]["role"], "user");
            assert_eq!(json["messages"][0]["content"], "hi");
            assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 0.001);
        }

        #[test]
        fn default_temperature_applies() {
            let client = test_client();
            let body = client.build_body(&[ChatTurn::user("hi")]);
            assert!((body.temperature - OpenAI::DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
        }
    }

    mod response_parsing {
        use super::*;

        #[test]
        fn takes_first_choice_content() {
            let parsed: ChatCompletionResponse = serde_json::from_str(
                r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}},
                    {"message":{"role":"assistant","content":"ignored"}}]}"#,
            )
            .unwrap();

            assert_eq!(OpenAI::parse_response(parsed).unwrap(), "Hello!");
        }

        #[test]
        fn empty_choices_is_an_error() {
            let parsed: ChatCompletionResponse =
                serde_json::from_str(r#"{"choices":[]}"#).unwrap();
            assert!(matches!(
                OpenAI::parse_response(parsed),
                Err(CompletionError::ResponseFormat { .. })
            ));
        }

        #[test]
        fn missing_content_is_an_error() {
            let parsed: ChatCompletionResponse =
                serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#)
                    .unwrap();
            assert!(matches!(
                OpenAI::parse_response(parsed),
                Err(CompletionError::ResponseFormat { .. })
            ));
        }
    }

    mod error_parsing {
        use super::*;

        #[test]
        fn maps_401_to_auth() {
            let err = OpenAI::parse_error(
                401,
                r#"{"error":{"message":"bad key","type":"invalid_request_error","code":null}}"#,
            );
            assert!(matches!(err, CompletionError::Auth { .. }));
        }

        #[test]
        fn maps_429_to_rate_limited() {
            let err = OpenAI::parse_error(
                429,
                r#"{"error":{"message":"slow down","type":"rate_limit_error","code":null}}"#,
            );
            assert!(matches!(err, CompletionError::RateLimited { .. }));
        }

        #[test]
        fn keeps_provider_code() {
            let err = OpenAI::parse_error(
                400,
                r#"{"error":{"message":"bad model","type":"invalid_request_error","code":"model_not_found"}}"#,
            );
            match err {
                CompletionError::Provider { code, .. } => {
                    assert_eq!(code.as_deref(), Some("model_not_found"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn unparseable_body_becomes_http_status() {
            let err = OpenAI::parse_error(503, "<html>gateway</html>");
            assert!(matches!(err, CompletionError::HttpStatus { status: 503, .. }));
        }
    }

    #[tokio::test]
    async fn empty_history_is_rejected_without_a_request() {
        let client = test_client();
        let result = client.generate(&[]).await;
        assert!(matches!(result, Err(CompletionError::ResponseFormat { .. })));
    }

    #[test]
    fn provider_name_is_stable() {
        assert_eq!(test_client().provider_name(), "openai");
    }
}
