use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::models::ChatReply;
use crate::client::ClientError;
use crate::db::{Chat, Note};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<Uuid>,
}

impl ChatTurn {
    pub fn general(message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..Default::default()
        }
    }

    pub fn about_note(message: &str, note: &Note) -> Self {
        Self {
            message: message.to_string(),
            note_id: Some(note.id),
            note_title: Some(note.title.clone()),
            note_content: Some(note.content.clone()),
            chat_id: None,
        }
    }
}

/// The server operations the dashboard depends on.
#[async_trait]
pub trait NotesBackend: Send + Sync {
    async fn list_notes(&self) -> Result<Vec<Note>, ClientError>;
    async fn create_note(&self, title: &str, content: &str) -> Result<Note, ClientError>;
    async fn update_note(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
        regenerate_summary: bool,
    ) -> Result<Note, ClientError>;
    async fn delete_note(&self, id: Uuid) -> Result<(), ClientError>;
    async fn regenerate_summary(&self, id: Uuid) -> Result<Note, ClientError>;

    async fn list_chats(&self, note_id: Option<Uuid>) -> Result<Vec<Chat>, ClientError>;
    async fn get_chat(&self, id: Uuid) -> Result<Chat, ClientError>;
    async fn create_chat(&self, title: &str, note_id: Option<Uuid>) -> Result<Chat, ClientError>;

    async fn send_chat(&self, turn: &ChatTurn) -> Result<ChatReply, ClientError>;
}

/// [`NotesBackend`] over the HTTP API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.bearer_auth(&self.api_key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl NotesBackend for ApiClient {
    async fn list_notes(&self) -> Result<Vec<Note>, ClientError> {
        self.send(self.client.get(self.url("/notes"))).await
    }

    async fn create_note(&self, title: &str, content: &str) -> Result<Note, ClientError> {
        let body = json!({ "title": title, "content": content });
        self.send(self.client.post(self.url("/notes")).json(&body)).await
    }

    async fn update_note(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
        regenerate_summary: bool,
    ) -> Result<Note, ClientError> {
        let body = json!({
            "title": title,
            "content": content,
            "regenerateSummary": regenerate_summary,
        });
        self.send(self.client.put(self.url(&format!("/notes/{}", id))).json(&body))
            .await
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .send(self.client.delete(self.url(&format!("/notes/{}", id))))
            .await?;
        Ok(())
    }

    async fn regenerate_summary(&self, id: Uuid) -> Result<Note, ClientError> {
        self.send(self.client.post(self.url(&format!("/notes/{}/summary", id))))
            .await
    }

    async fn list_chats(&self, note_id: Option<Uuid>) -> Result<Vec<Chat>, ClientError> {
        let mut request = self.client.get(self.url("/chats"));
        if let Some(note_id) = note_id {
            request = request.query(&[("noteId", note_id.to_string())]);
        }
        self.send(request).await
    }

    async fn get_chat(&self, id: Uuid) -> Result<Chat, ClientError> {
        self.send(self.client.get(self.url(&format!("/chats/{}", id))))
            .await
    }

    async fn create_chat(&self, title: &str, note_id: Option<Uuid>) -> Result<Chat, ClientError> {
        let body = json!({ "title": title, "noteId": note_id });
        self.send(self.client.post(self.url("/chats")).json(&body)).await
    }

    async fn send_chat(&self, turn: &ChatTurn) -> Result<ChatReply, ClientError> {
        self.send(self.client.post(self.url("/chat")).json(turn)).await
    }
}
