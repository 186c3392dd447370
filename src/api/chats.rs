use actix_web::{delete, get, post, web, HttpResponse};
use tracing::info;
use uuid::Uuid;

use crate::api::error::{required, ApiError};
use crate::api::middleware::AuthenticatedUser;
use crate::api::models::{ChatListQuery, CreateChatRequest, CreateMessageRequest, StatusMessage};
use crate::api::parse_optional_id;
use crate::db::{service::DbService, DbPool, MessageRole};

#[get("")]
pub async fn list_chats(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<ChatListQuery>,
) -> Result<HttpResponse, ApiError> {
    let note_id = parse_optional_id(query.note_id.as_deref())
        .map_err(|_| ApiError::Validation("Invalid noteId".to_string()))?;

    let conn = pool.lock()?;
    let chats = DbService::list_chats(&conn, &user.user_id, note_id)?;
    Ok(HttpResponse::Ok().json(chats))
}

#[post("")]
pub async fn create_chat(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    req: web::Json<CreateChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let title = required(&req.title, "Title is required")?;
    // An id that does not parse cannot name one of the caller's notes
    let note_id = parse_optional_id(req.note_id.as_deref()).map_err(|_| ApiError::NotFound("Note"))?;

    let conn = pool.lock()?;
    if let Some(note_id) = note_id {
        if DbService::get_note(&conn, &user.user_id, note_id)?.is_none() {
            return Err(ApiError::NotFound("Note"));
        }
    }

    let chat = DbService::insert_chat(&conn, &user.user_id, title, note_id)?;
    info!(chat_id = %chat.id, user_id = %user.user_id, "Created chat");
    Ok(HttpResponse::Created().json(chat))
}

#[get("/{id}")]
pub async fn get_chat(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.lock()?;
    let chat = DbService::get_chat(&conn, &user.user_id, id.into_inner())?
        .ok_or(ApiError::NotFound("Chat"))?;
    Ok(HttpResponse::Ok().json(chat))
}

#[delete("/{id}")]
pub async fn delete_chat(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.lock()?;
    if !DbService::delete_chat(&conn, &user.user_id, id.into_inner())? {
        return Err(ApiError::NotFound("Chat"));
    }
    Ok(HttpResponse::Ok().json(StatusMessage {
        message: "Chat deleted successfully",
    }))
}

#[post("/{id}/messages")]
pub async fn add_message(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
    req: web::Json<CreateMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    if req.content.trim().is_empty() || req.role.trim().is_empty() {
        return Err(ApiError::Validation("Content and role are required".to_string()));
    }
    let role = MessageRole::parse(&req.role)
        .ok_or_else(|| ApiError::Validation("Invalid role".to_string()))?;

    let conn = pool.lock()?;
    if DbService::get_chat(&conn, &user.user_id, id)?.is_none() {
        return Err(ApiError::NotFound("Chat"));
    }

    let message = DbService::insert_message(&conn, id, role, &req.content)?;
    Ok(HttpResponse::Created().json(message))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chats")
            .service(list_chats)
            .service(create_chat)
            .service(get_chat)
            .service(delete_chat)
            .service(add_message),
    );
}
