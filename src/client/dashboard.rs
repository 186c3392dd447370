use tracing::warn;
use uuid::Uuid;

use crate::client::api::{ChatTurn, NotesBackend};
use crate::client::store::{Action, DashboardState, Notification, ViewMode};
use crate::client::ClientError;
use crate::db::{Chat, Note};

/// Titles derived from free text keep this many characters.
const TITLE_CHARS: usize = 50;

/// Marker placed between a note's content and an appended assistant reply.
pub const RESPONSE_SEPARATOR: &str = "\n\n---\n\n";

/// What a typed message turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    /// Assistant reply to a turn about the selected note.
    NoteReply { chat_id: Uuid, reply: String },
    /// Assistant reply to a general turn.
    GeneralReply { chat_id: Uuid, reply: String },
    /// The text was a request to create a note, and this note was created.
    NoteCreated(Note),
}

/// First characters of `text`, for titles built from user input.
pub fn title_from(text: &str) -> String {
    text.trim().chars().take(TITLE_CHARS).collect::<String>().trim_end().to_string()
}

/// Messages asking to create a note are turned into notes directly.
pub fn is_create_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("create") && lower.contains("note")
}

pub struct Dashboard<B: NotesBackend> {
    backend: B,
    state: DashboardState,
}

impl<B: NotesBackend> Dashboard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: DashboardState::default(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state.apply(action);
    }

    /// Records the failure as a toast and hands the error back.
    fn fail<T>(&mut self, text: &str, err: ClientError) -> Result<T, ClientError> {
        warn!("{}: {}", text, err);
        self.dispatch(Action::Notify(Notification::error(text)));
        Err(err)
    }

    fn notify_success(&mut self, text: &str) {
        self.dispatch(Action::Notify(Notification::success(text)));
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let notes = match self.backend.list_notes().await {
            Ok(notes) => notes,
            Err(e) => return self.fail("Failed to fetch notes", e),
        };
        let chats = match self.backend.list_chats(None).await {
            Ok(chats) => chats,
            Err(e) => return self.fail("Failed to fetch chats", e),
        };
        self.dispatch(Action::NotesLoaded(notes));
        self.dispatch(Action::ChatsLoaded(chats));
        Ok(())
    }

    pub async fn create_note(&mut self, title: &str, content: &str) -> Result<Note, ClientError> {
        match self.backend.create_note(title, content).await {
            Ok(note) => {
                self.dispatch(Action::NoteSaved(note.clone()));
                self.notify_success("Note created successfully!");
                Ok(note)
            }
            Err(e) => self.fail("Failed to create note", e),
        }
    }

    /// Opens the edit view for a note.
    pub fn begin_edit(&mut self, id: Uuid) {
        self.dispatch(Action::SelectNote(Some(id)));
        self.dispatch(Action::SetView(ViewMode::Edit));
    }

    pub async fn edit_note(
        &mut self,
        id: Uuid,
        title: &str,
        content: &str,
        regenerate_summary: bool,
    ) -> Result<Note, ClientError> {
        match self
            .backend
            .update_note(id, title, content, regenerate_summary)
            .await
        {
            Ok(note) => {
                self.dispatch(Action::NoteSaved(note.clone()));
                if self.state.view == ViewMode::Edit {
                    self.dispatch(Action::SetView(ViewMode::Chat));
                }
                self.notify_success("Note updated successfully!");
                Ok(note)
            }
            Err(e) => self.fail("Failed to update note", e),
        }
    }

    pub async fn delete_note(&mut self, id: Uuid) -> Result<(), ClientError> {
        match self.backend.delete_note(id).await {
            Ok(()) => {
                self.dispatch(Action::NoteRemoved(id));
                self.notify_success("Note deleted successfully!");
                Ok(())
            }
            Err(e) => self.fail("Failed to delete note", e),
        }
    }

    pub async fn regenerate_summary(&mut self, id: Uuid) -> Result<Note, ClientError> {
        match self.backend.regenerate_summary(id).await {
            Ok(note) => {
                self.dispatch(Action::NoteSaved(note.clone()));
                self.notify_success("Summary regenerated successfully!");
                Ok(note)
            }
            Err(e) => self.fail("Failed to regenerate summary", e),
        }
    }

    /// Re-fetches the chats anchored to one note and returns them, newest first.
    pub async fn load_note_chats(&mut self, note_id: Uuid) -> Result<Vec<Chat>, ClientError> {
        let chats = match self.backend.list_chats(Some(note_id)).await {
            Ok(chats) => chats,
            Err(e) => return self.fail("Failed to fetch chats", e),
        };
        // Upserts push to the front, so replay oldest first
        for chat in chats.iter().rev() {
            self.dispatch(Action::ChatSaved(chat.clone()));
        }
        Ok(self
            .state
            .chats_for_note(note_id)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn select_note(&mut self, id: Option<Uuid>) {
        self.dispatch(Action::SelectNote(id));
    }

    pub fn select_chat(&mut self, id: Option<Uuid>) {
        self.dispatch(Action::SelectChat(id));
    }

    /// Starts a fresh conversation, anchored to the selected note if any.
    pub async fn new_chat(&mut self, title: &str) -> Result<Uuid, ClientError> {
        let note_id = self.state.selected_note;
        match self.backend.create_chat(title, note_id).await {
            Ok(chat) => {
                let id = chat.id;
                self.dispatch(Action::ChatSaved(chat));
                self.dispatch(Action::SelectChat(Some(id)));
                Ok(id)
            }
            Err(e) => self.fail("Failed to create chat", e),
        }
    }

    /// Returns the selected chat, creating one first if none is selected.
    pub async fn ensure_chat(&mut self, title: &str) -> Result<Uuid, ClientError> {
        match self.state.selected_chat {
            Some(id) => Ok(id),
            None => self.new_chat(title).await,
        }
    }

    /// Routes typed text: a turn about the selected note, a note-creation
    /// request, or a general turn.
    pub async fn send_message(&mut self, text: &str) -> Result<SentMessage, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation("Message is empty".to_string()));
        }

        if let Some(note) = self.state.selected_note().cloned() {
            let chat_id = self.ensure_chat(&note.title).await?;
            let turn = ChatTurn {
                chat_id: Some(chat_id),
                ..ChatTurn::about_note(text, &note)
            };
            let reply = self.exchange(chat_id, &turn).await?;
            return Ok(SentMessage::NoteReply { chat_id, reply });
        }

        if is_create_request(text) {
            let note = self.create_note(&title_from(text), text).await?;
            self.select_note(Some(note.id));
            return Ok(SentMessage::NoteCreated(note));
        }

        let chat_id = self.ensure_chat(&title_from(text)).await?;
        let turn = ChatTurn {
            chat_id: Some(chat_id),
            ..ChatTurn::general(text)
        };
        let reply = self.exchange(chat_id, &turn).await?;
        Ok(SentMessage::GeneralReply { chat_id, reply })
    }

    async fn exchange(&mut self, chat_id: Uuid, turn: &ChatTurn) -> Result<String, ClientError> {
        let reply = match self.backend.send_chat(turn).await {
            Ok(reply) => reply,
            Err(e) => return self.fail("Failed to get AI response", e),
        };

        if reply.saved {
            match self.backend.get_chat(chat_id).await {
                Ok(chat) => self.dispatch(Action::ChatSaved(chat)),
                Err(e) => warn!(%chat_id, "Failed to reload chat: {}", e),
            }
        } else {
            self.dispatch(Action::Notify(Notification::error(
                "The conversation could not be saved",
            )));
        }

        Ok(reply.response)
    }

    /// Appends an assistant reply to the selected note and regenerates its summary.
    pub async fn add_response_to_note(&mut self, response: &str) -> Result<Note, ClientError> {
        let Some(note) = self.state.selected_note().cloned() else {
            return Err(ClientError::Validation("No note selected".to_string()));
        };

        let content = format!("{}{}{}", note.content, RESPONSE_SEPARATOR, response.trim());
        match self
            .backend
            .update_note(note.id, &note.title, &content, true)
            .await
        {
            Ok(updated) => {
                self.dispatch(Action::NoteSaved(updated.clone()));
                self.notify_success("Response added to note");
                Ok(updated)
            }
            Err(e) => self.fail("Failed to add response to note", e),
        }
    }
}
