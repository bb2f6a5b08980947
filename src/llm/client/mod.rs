//! LLM client for OCR spelling correction.
//!
//! Supports the Gemini `generateContent` API, Ollama, and OpenAI-compatible
//! chat completion endpoints. Responses are returned verbatim.

mod config;
mod prompts;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use config::{LlmConfig, LlmProvider};
pub use prompts::{build_correction_prompt, DEFAULT_CORRECTION_PROMPT};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No credential was supplied for a provider that needs one
    #[error("API key missing for {0}")]
    MissingApiKey(&'static str),
    /// HTTP client could not be constructed
    #[error("Client setup failed: {0}")]
    Client(String),
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response carried no text
    #[error("Model returned no text")]
    EmptyResponse,
}

/// A language model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier used for requests.
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Builds a generator from a per-job credential.
pub trait GeneratorFactory: Send + Sync {
    /// Whether a credential must be supplied before a job can start.
    fn requires_api_key(&self) -> bool {
        true
    }

    fn connect(&self, api_key: &str) -> Result<Arc<dyn TextGenerator>, LlmError>;
}

impl GeneratorFactory for LlmConfig {
    fn requires_api_key(&self) -> bool {
        self.provider.requires_api_key()
    }

    fn connect(&self, api_key: &str) -> Result<Arc<dyn TextGenerator>, LlmError> {
        let config = if api_key.trim().is_empty() {
            self.clone()
        } else {
            self.clone().with_api_key(api_key.trim())
        };
        Ok(Arc::new(LlmClient::new(config)?))
    }
}

/// HTTP client for the configured provider.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// OpenAI chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let has_key = config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if config.provider.requires_api_key() && !has_key {
            return Err(LlmError::MissingApiKey(config.provider.as_str()));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    /// Call Gemini `generateContent` with a prompt.
    async fn call_gemini(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint(),
            self.config.model
        );
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        parse_gemini_response(&body)
    }

    /// Call Ollama API with a prompt.
    async fn call_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let url = format!("{}/api/generate", self.config.endpoint());
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }

    /// Call an OpenAI-compatible chat completions endpoint.
    async fn call_openai(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint());
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(
            "Sending {} chars to {} ({})",
            prompt.len(),
            self.config.provider.as_str(),
            self.config.model
        );
        match self.config.provider {
            LlmProvider::Gemini => self.call_gemini(prompt).await,
            LlmProvider::Ollama => self.call_ollama(prompt).await,
            LlmProvider::OpenAI => self.call_openai(prompt).await,
        }
    }
}

/// Extract the text of the first candidate, joining all of its text parts.
fn parse_gemini_response(body: &str) -> Result<String, LlmError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(LlmError::Api(error.message));
    }

    let parts: Vec<String> = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if parts.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(parts.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gemini_response() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Xin chào\n"}, {"text": "thế giới"}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(parse_gemini_response(body).unwrap(), "Xin chào\nthế giới");
    }

    #[test]
    fn test_parse_gemini_response_keeps_whitespace() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "  padded  \n"}]}}]}"#;
        assert_eq!(parse_gemini_response(body).unwrap(), "  padded  \n");
    }

    #[test]
    fn test_parse_gemini_error_and_empty() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert!(matches!(
            parse_gemini_response(body),
            Err(LlmError::Api(msg)) if msg == "API key not valid"
        ));

        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert!(matches!(
            parse_gemini_response(body),
            Err(LlmError::EmptyResponse)
        ));

        assert!(matches!(
            parse_gemini_response("not json"),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_gemini_request_shape() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_new_requires_key_for_gemini() {
        let err = LlmClient::new(LlmConfig::default()).err().unwrap();
        assert!(matches!(err, LlmError::MissingApiKey("gemini")));

        let err = LlmClient::new(LlmConfig::default().with_api_key("   "))
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            ..Default::default()
        };
        assert!(!config.requires_api_key());
        let generator = config.connect("").unwrap();
        assert_eq!(generator.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_factory_applies_key() {
        let generator = LlmConfig::default().connect(" key-123 ").unwrap();
        assert_eq!(generator.model(), "gemini-2.5-flash");
    }
}
