use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::llm::{
    models::{ChatOptions, ChatResponse, Message, Usage},
    status_error, LlmError, LlmProvider,
};

/// Google Generative Language API (`models/{model}:generateContent`).
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            default_model,
        }
    }
}

/// Gemini keeps the system prompt out of `contents` and calls the assistant role "model".
pub fn build_request_body(messages: &[Message], options: &ChatOptions) -> Value {
    let mut system = String::new();
    let contents: Vec<Value> = messages
        .iter()
        .filter_map(|m| {
            if m.role == "system" {
                system.push_str(&m.content);
                system.push('\n');
                return None;
            }
            let role = if m.role == "assistant" { "model" } else { "user" };
            Some(json!({ "role": role, "parts": [{ "text": m.content }] }))
        })
        .collect();

    if let Some(opts_system) = &options.system_prompt {
        system.push_str(opts_system);
    }

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": options.temperature.unwrap_or(0.7),
            "maxOutputTokens": options.max_tokens.unwrap_or(2048),
        }
    });

    let system = system.trim();
    if !system.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }

    body
}

pub fn parse_response(json: &Value, model: &str) -> Result<ChatResponse, LlmError> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| LlmError::InvalidResponse("no candidates in response".to_string()))?;

    let content: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if content.is_empty() {
        return Err(LlmError::InvalidResponse("candidate has no text".to_string()));
    }

    let usage = json.get("usageMetadata").map(|u| Usage {
        input_tokens: u["promptTokenCount"].as_u64().unwrap_or(0) as u32,
        output_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
    });

    Ok(ChatResponse {
        content,
        model: model.to_string(),
        usage,
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        let model = options.model.as_deref().unwrap_or(&self.default_model).to_string();
        let body = build_request_body(messages, &options);

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error("Gemini", response).await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        parse_response(&json, &model)
    }
}
