//! Client side of the dashboard: a local cache of the caller's notes and
//! chats, the HTTP backend it talks to, and the controller that turns user
//! intents into API calls.

pub mod api;
pub mod dashboard;
pub mod store;

use thiserror::Error;

pub use api::{ApiClient, ChatTurn, NotesBackend};
pub use dashboard::{Dashboard, SentMessage};
pub use store::{Action, DashboardState, Notification, NotificationKind, ViewMode};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Validation(String),
}
