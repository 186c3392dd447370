use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::llm::{
    models::{ChatOptions, ChatResponse, Message, Usage},
    status_error, LlmError, LlmProvider,
};

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    default_model: String,
}

impl OllamaProvider {
    pub fn new(base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            default_model,
        }
    }
}

pub fn parse_response(json: &Value, model: &str) -> Result<ChatResponse, LlmError> {
    let content = json["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::InvalidResponse("missing message.content".to_string()))?
        .to_string();

    // Ollama reports token counts only once generation is done
    let usage = json["eval_count"].as_u64().map(|output| Usage {
        input_tokens: json["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
        output_tokens: output as u32,
    });

    Ok(ChatResponse {
        content,
        model: model.to_string(),
        usage,
    })
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
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
            "stream": false,
            "options": {
                "temperature": options.temperature.unwrap_or(0.7),
                "num_predict": options.max_tokens.unwrap_or(2048)
            }
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        parse_response(&json, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_only_when_eval_count_present() {
        let partial = json!({ "message": { "role": "assistant", "content": "ok" } });
        assert!(parse_response(&partial, "llama3.2").unwrap().usage.is_none());

        let done = json!({
            "message": { "role": "assistant", "content": "ok" },
            "prompt_eval_count": 10,
            "eval_count": 4
        });
        let usage = parse_response(&done, "llama3.2").unwrap().usage.unwrap();
        assert_eq!((usage.input_tokens, usage.output_tokens), (10, 4));
    }
}
