use actix_web::{post, web, HttpResponse};
use tracing::{info, warn};

use crate::api::error::{required, ApiError};
use crate::api::middleware::AuthenticatedUser;
use crate::api::models::{ChatReply, ChatRequest};
use crate::api::parse_optional_id;
use crate::assistant::Assistant;
use crate::db::{service::DbService, DbPool};

/// Generates an assistant reply and, when a chat id is given, stores the
/// exchange. Storage problems are logged and reported through `saved`; the
/// generated reply is always returned.
#[post("/chat")]
pub async fn send_chat(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    assistant: web::Data<Assistant>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let message = required(&req.message, "Message is required")?;

    let reply = match req.note_context() {
        Some((title, content)) => assistant.converse_about_note(title, content, message).await,
        None => assistant.converse_general(message).await,
    }
    .map_err(|e| ApiError::ChatGeneration(e.to_string()))?;

    let saved = match req.chat_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(raw) => save_exchange(&pool, &user, raw, message, &reply),
        None => false,
    };

    Ok(HttpResponse::Ok().json(ChatReply {
        response: reply,
        saved,
    }))
}

fn save_exchange(
    pool: &DbPool,
    user: &AuthenticatedUser,
    raw_chat_id: &str,
    message: &str,
    reply: &str,
) -> bool {
    match try_save_exchange(pool, user, raw_chat_id, message, reply) {
        Ok(true) => true,
        Ok(false) => {
            warn!(chat_id = raw_chat_id, "Chat not found for caller, exchange not saved");
            false
        }
        Err(e) => {
            warn!(chat_id = raw_chat_id, "Failed to save chat exchange: {}", e);
            false
        }
    }
}

fn try_save_exchange(
    pool: &DbPool,
    user: &AuthenticatedUser,
    raw_chat_id: &str,
    message: &str,
    reply: &str,
) -> Result<bool, ApiError> {
    let Ok(Some(chat_id)) = parse_optional_id(Some(raw_chat_id)) else {
        return Ok(false);
    };

    let conn = pool.lock()?;
    if DbService::get_chat(&conn, &user.user_id, chat_id)?.is_none() {
        return Ok(false);
    }
    DbService::append_exchange(&conn, chat_id, message, reply)?;

    info!(%chat_id, user_id = %user.user_id, "Saved chat exchange");
    Ok(true)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(send_chat);
}
