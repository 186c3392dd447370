use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub regenerate_summary: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListQuery {
    pub note_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    #[serde(default)]
    pub title: String,
    pub note_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub note_id: Option<String>,
    pub note_content: Option<String>,
    pub note_title: Option<String>,
    pub chat_id: Option<String>,
}

impl ChatRequest {
    /// Title and content of the note to ground the reply in, when the
    /// request carries a complete note context.
    pub fn note_context(&self) -> Option<(&str, &str)> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        present(&self.note_id)?;
        Some((present(&self.note_title)?, present(&self.note_content)?))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// Whether the exchange was written to the chat named by `chatId`.
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}
