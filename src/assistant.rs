//! Prompting layer over an [`LlmProvider`]: note summaries, icon
//! classification and conversational replies.
//!
//! Every call is raced against the configured deadline. When the deadline
//! wins, the provider future is dropped and the caller gets
//! [`LlmError::Timeout`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::AssistantConfig;
use crate::icons::{self, IconKind};
use crate::llm::{
    models::{ChatOptions, Message},
    LlmError, LlmProvider,
};

const GENERAL_SYSTEM_PROMPT: &str = "You are the Thought Sort assistant. You help people capture, \
organize and reflect on their notes. Be concise and practical, and suggest turning useful ideas \
into notes when it makes sense.";

const NOTE_SYSTEM_PROMPT: &str = "You are the Thought Sort assistant. The user is asking about one \
of their notes. Ground every answer in the note and reference its specific details.";

/// Icon names offered to the model when keyword matching finds nothing.
const ICON_EXAMPLES: &[IconKind] = &[
    IconKind::Briefcase,
    IconKind::Lightbulb,
    IconKind::Code,
    IconKind::Heart,
    IconKind::Plane,
    IconKind::Book,
    IconKind::Target,
    IconKind::Music,
    IconKind::ShoppingCart,
    IconKind::Calendar,
    IconKind::Users,
    IconKind::Star,
    IconKind::FileText,
];

const MIN_ICON_LEN: usize = 3;
const MAX_ICON_LEN: usize = 20;

#[derive(Clone)]
pub struct Assistant {
    provider: Arc<dyn LlmProvider>,
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(provider: Arc<dyn LlmProvider>, config: AssistantConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn generate(
        &self,
        what: &'static str,
        prompt: String,
        system_prompt: Option<&str>,
        timeout_secs: u64,
    ) -> Result<String, LlmError> {
        let messages = [Message::user(prompt)];
        let options = ChatOptions {
            system_prompt: system_prompt.map(str::to_string),
            ..Default::default()
        };

        debug!(provider = self.provider.name(), what, "Sending generation request");

        match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.provider.chat(&messages, options),
        )
        .await
        {
            Ok(result) => result.map(|r| r.content),
            Err(_) => Err(LlmError::Timeout(what, timeout_secs)),
        }
    }

    /// Prose summary of a note, asked to stay under 200 words.
    pub async fn summarize(&self, content: &str) -> Result<String, LlmError> {
        let prompt = format!(
            "Please provide a concise summary of the following text. Focus on the main points \
             and key insights. Keep it under 200 words:\n\n{}",
            content
        );
        let summary = self
            .generate("summary", prompt, None, self.config.summary_timeout_secs)
            .await?;
        Ok(summary.trim().to_string())
    }

    /// Keyword inference first, the model only when inference gives nothing
    /// better than the default icon.
    /// Never fails: every error path ends at the default icon.
    pub async fn classify_icon(&self, content: &str) -> IconKind {
        let inferred = icons::infer_icon(content);
        if !inferred.is_default() {
            return inferred;
        }
        if content.trim().is_empty() {
            return IconKind::default();
        }

        let names: Vec<&str> = ICON_EXAMPLES.iter().map(|i| i.name()).collect();
        let prompt = format!(
            "Pick the single icon that best represents the following note. Answer with one icon \
             name such as {}. Respond with the icon name only, nothing else.\n\nNote: {}",
            names.join(", "),
            content
        );

        match self
            .generate("icon", prompt, None, self.config.icon_timeout_secs)
            .await
        {
            Ok(reply) => parse_icon_reply(&reply).unwrap_or_else(|| {
                warn!(reply = %reply.trim(), "Model suggested an unusable icon, using default");
                IconKind::default()
            }),
            Err(e) => {
                warn!("Icon generation failed, using default: {}", e);
                IconKind::default()
            }
        }
    }

    /// Reply to a question about one specific note.
    pub async fn converse_about_note(
        &self,
        note_title: &str,
        note_content: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let prompt = format!(
            "Note title: {}\n\nNote content:\n{}\n\nUser message: {}\n\n\
             Respond helpfully and reference specific details from the note where relevant.",
            note_title, note_content, user_message
        );
        self.generate(
            "chat",
            prompt,
            Some(NOTE_SYSTEM_PROMPT),
            self.config.chat_timeout_secs,
        )
        .await
    }

    pub async fn converse_general(&self, user_message: &str) -> Result<String, LlmError> {
        self.generate(
            "chat",
            user_message.to_string(),
            Some(GENERAL_SYSTEM_PROMPT),
            self.config.chat_timeout_secs,
        )
        .await
    }
}

/// Accepts a short identifier, optionally wrapped in quotes or backticks,
/// that names an icon in the vocabulary.
fn parse_icon_reply(reply: &str) -> Option<IconKind> {
    let candidate = reply
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.');
    if candidate.len() < MIN_ICON_LEN || candidate.len() > MAX_ICON_LEN {
        return None;
    }
    IconKind::from_name(candidate)
}
