use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::llm::{
    models::{ChatOptions, ChatResponse, Message, Usage},
    status_error, LlmError, LlmProvider,
};

/// Any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            default_model,
        }
    }
}

pub fn parse_response(json: &Value, model: &str) -> Result<ChatResponse, LlmError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message.content".to_string()))?
        .to_string();

    let usage = json.get("usage").map(|u| Usage {
        input_tokens: u["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: u["completion_tokens"].as_u64().unwrap_or(0) as u32,
    });

    Ok(ChatResponse {
        content,
        model: model.to_string(),
        usage,
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        let model = options.model.as_deref().unwrap_or(&self.default_model);

        let mut final_messages: Vec<Message> = messages.to_vec();
        if let Some(system) = &options.system_prompt {
            final_messages.insert(
                0,
                Message {
                    role: "system".to_string(),
                    content: system.clone(),
                },
            );
        }

        let body = json!({
            "model": model,
            "messages": final_messages,
            "temperature": options.temperature.unwrap_or(0.7),
            "max_tokens": options.max_tokens.unwrap_or(2048),
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error("OpenAI", response).await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        parse_response(&json, model)
    }
}
