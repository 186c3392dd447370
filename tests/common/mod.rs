#![allow(dead_code, unused_macros)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thoughtsort::assistant::Assistant;
use thoughtsort::config::{AppConfig, AssistantConfig, AuthConfig, DatabaseConfig, UserKey};
use thoughtsort::db::{self, DbPool};
use thoughtsort::llm::{
    models::{ChatOptions, ChatResponse, Message},
    LlmError, LlmProvider,
};

pub const ALICE_KEY: &str = "alice-key";
pub const BOB_KEY: &str = "bob-key";

/// Provider that answers every prompt with the same text, or fails.
pub struct ScriptedProvider {
    reply: Option<String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            delay: Some(delay),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        let mut prompt = options.system_prompt.unwrap_or_default();
        if let Some(last) = messages.last() {
            prompt.push('\n');
            prompt.push_str(&last.content);
        }
        self.prompts.lock().unwrap().push(prompt);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Some(reply) => Ok(ChatResponse {
                content: reply.clone(),
                model: "scripted-1".to_string(),
                usage: None,
            }),
            None => Err(LlmError::Api("scripted failure".to_string())),
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        auth: AuthConfig {
            users: vec![
                UserKey {
                    user_id: "alice".to_string(),
                    api_key: ALICE_KEY.to_string(),
                },
                UserKey {
                    user_id: "bob".to_string(),
                    api_key: BOB_KEY.to_string(),
                },
            ],
        },
        assistant: AssistantConfig {
            summary_timeout_secs: 1,
            icon_timeout_secs: 1,
            chat_timeout_secs: 1,
        },
        ..Default::default()
    }
}

pub fn test_pool() -> DbPool {
    db::get_connection(&test_config().database).unwrap()
}

pub fn test_assistant(provider: Arc<ScriptedProvider>) -> Assistant {
    Assistant::new(provider, test_config().assistant)
}

pub fn bearer(key: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", key))
}

/// Builds the API under test with the given pool and provider.
macro_rules! test_app {
    ($pool:expr, $provider:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($crate::common::test_config()))
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new($crate::common::test_assistant(
                    $provider.clone(),
                )))
                .wrap(thoughtsort::api::ApiKeyAuth)
                .configure(thoughtsort::api::configure),
        )
        .await
    };
}
