pub mod gemini;
pub mod models;
pub mod ollama;
pub mod openai;

use gemini::GeminiProvider;
use ollama::OllamaProvider;
use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use models::{ChatOptions, ChatResponse, Message};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("Invalid Response: {0}")]
    InvalidResponse(String),
    #[error("Rate Limited")]
    RateLimited,
    #[error("{0} timed out after {1}s")]
    Timeout(&'static str, u64),
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError>;
}

/// Builds the configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Option<Arc<dyn LlmProvider>> {
        match config.llm.provider.as_str() {
            "gemini" => {
                let cfg = config.llm.gemini.as_ref()?;
                Some(Arc::new(GeminiProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.default_model.clone(),
                )))
            }
            "openai" => {
                let cfg = config.llm.openai.as_ref()?;
                Some(Arc::new(OpenAiProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.default_model.clone(),
                )))
            }
            "ollama" => {
                let cfg = config.llm.ollama.as_ref()?;
                Some(Arc::new(OllamaProvider::new(
                    cfg.base_url.clone(),
                    cfg.default_model.clone(),
                )))
            }
            _ => None,
        }
    }
}

/// Maps a non-success HTTP status to an error, keeping 429 distinct.
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> LlmError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimited;
    }
    LlmError::Api(format!("{} Error {}: {}", provider, status, text))
}
