//! LLM client configuration.

use serde::{Deserialize, Serialize};

use super::prompts::DEFAULT_CORRECTION_PROMPT;

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API (default)
    #[default]
    Gemini,
    /// Ollama API (local)
    Ollama,
    /// OpenAI-compatible API (OpenAI, Groq, Together.ai, etc.)
    #[serde(alias = "groq", alias = "together")]
    OpenAI,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Ollama => "http://localhost:11434",
            Self::OpenAI => "https://api.openai.com",
        }
    }

    /// Whether requests must carry an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (gemini, ollama or openai)
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key; usually supplied per job instead of stored in the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds (no timeout when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Custom correction prompt (uses the {content} placeholder)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_prompt: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: None,
            api_key: None,
            model: default_model(),
            timeout_secs: None,
            correction_prompt: None,
        }
    }
}

impl LlmConfig {
    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_PROVIDER`: "gemini" (default), "ollama", "openai", "groq" or "together"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key for any provider
    /// - `GEMINI_API_KEY` / `OPENAI_API_KEY`: provider-specific key fallback
    /// - `LLM_MODEL`: Model name
    /// - `LLM_TIMEOUT_SECS`: Request timeout
    /// - `LLM_CORRECTION_PROMPT`: Custom correction prompt
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("LLM_PROVIDER") {
            if let Some(provider) = LlmProvider::from_str(&val) {
                self.provider = provider;
            }
        }
        if let Ok(val) = std::env::var("LLM_ENDPOINT") {
            self.endpoint = Some(val);
        }
        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.api_key = Some(val);
        }
        if self.api_key.is_none() {
            self.api_key = match self.provider {
                LlmProvider::Gemini => std::env::var("GEMINI_API_KEY").ok(),
                LlmProvider::OpenAI => std::env::var("OPENAI_API_KEY").ok(),
                LlmProvider::Ollama => None,
            };
        }
        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("LLM_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = Some(n);
            }
        }
        if let Ok(val) = std::env::var("LLM_CORRECTION_PROMPT") {
            self.correction_prompt = Some(val);
        }
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Endpoint to call, falling back to the provider default.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }

    /// Get the correction prompt, using custom or default.
    pub fn get_correction_prompt(&self) -> &str {
        self.correction_prompt
            .as_deref()
            .unwrap_or(DEFAULT_CORRECTION_PROMPT)
    }

    /// Copy with the API key blanked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.api_key.is_some() {
            copy.api_key = Some("********".to_string());
        }
        copy
    }
}
