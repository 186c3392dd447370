use uuid::Uuid;

use crate::db::{Chat, Note};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Notes,
    Chat,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    NotesLoaded(Vec<Note>),
    NoteSaved(Note),
    NoteRemoved(Uuid),
    ChatsLoaded(Vec<Chat>),
    ChatSaved(Chat),
    SelectNote(Option<Uuid>),
    SelectChat(Option<Uuid>),
    SetView(ViewMode),
    Search(String),
    Notify(Notification),
    ClearNotifications,
}

/// Local copy of server state. Collections are kept in the server's order:
/// most recently updated first.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub notes: Vec<Note>,
    pub chats: Vec<Chat>,
    pub selected_note: Option<Uuid>,
    pub selected_chat: Option<Uuid>,
    pub view: ViewMode,
    pub search: String,
    pub notifications: Vec<Notification>,
}

impl DashboardState {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::NotesLoaded(notes) => {
                self.notes = notes;
                if let Some(id) = self.selected_note {
                    if !self.notes.iter().any(|n| n.id == id) {
                        self.selected_note = None;
                    }
                }
            }
            Action::NoteSaved(note) => {
                self.notes.retain(|n| n.id != note.id);
                for chat in self.chats.iter_mut().filter(|c| c.note_id == Some(note.id)) {
                    if let Some(note_ref) = chat.note.as_mut() {
                        note_ref.title = note.title.clone();
                    }
                }
                self.notes.insert(0, note);
            }
            Action::NoteRemoved(id) => {
                self.notes.retain(|n| n.id != id);
                for chat in self.chats.iter_mut().filter(|c| c.note_id == Some(id)) {
                    chat.note_id = None;
                    chat.note = None;
                }
                if self.selected_note == Some(id) {
                    self.selected_note = None;
                    self.view = ViewMode::Notes;
                }
            }
            Action::ChatsLoaded(chats) => {
                self.chats = chats;
                if let Some(id) = self.selected_chat {
                    if !self.chats.iter().any(|c| c.id == id) {
                        self.selected_chat = None;
                    }
                }
            }
            Action::ChatSaved(chat) => {
                self.chats.retain(|c| c.id != chat.id);
                self.chats.insert(0, chat);
            }
            Action::SelectNote(id) => {
                self.selected_note = id;
                // Resume the latest conversation about the note, if there is one
                self.selected_chat = id.and_then(|id| {
                    self.chats
                        .iter()
                        .find(|c| c.note_id == Some(id))
                        .map(|c| c.id)
                });
                self.view = if id.is_some() { ViewMode::Chat } else { ViewMode::Notes };
            }
            Action::SelectChat(id) => {
                self.selected_chat = id;
                if let Some(chat) = id.and_then(|id| self.chats.iter().find(|c| c.id == id)) {
                    self.selected_note = chat.note_id;
                    self.view = ViewMode::Chat;
                }
            }
            Action::SetView(view) => self.view = view,
            Action::Search(term) => self.search = term,
            Action::Notify(notification) => self.notifications.push(notification),
            Action::ClearNotifications => self.notifications.clear(),
        }
    }

    pub fn selected_note(&self) -> Option<&Note> {
        let id = self.selected_note?;
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn selected_chat(&self) -> Option<&Chat> {
        let id = self.selected_chat?;
        self.chats.iter().find(|c| c.id == id)
    }

    /// Notes whose title or content contains the search term, ignoring case.
    pub fn visible_notes(&self) -> Vec<&Note> {
        let term = self.search.trim().to_lowercase();
        self.notes
            .iter()
            .filter(|n| {
                term.is_empty()
                    || n.title.to_lowercase().contains(&term)
                    || n.content.to_lowercase().contains(&term)
            })
            .collect()
    }

    /// Chats anchored to the given note, most recent first.
    pub fn chats_for_note(&self, note_id: Uuid) -> Vec<&Chat> {
        self.chats
            .iter()
            .filter(|c| c.note_id == Some(note_id))
            .collect()
    }
}
