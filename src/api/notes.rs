use actix_web::{delete, get, post, put, web, HttpResponse};
use tracing::info;
use uuid::Uuid;

use crate::api::error::{required, ApiError};
use crate::api::middleware::AuthenticatedUser;
use crate::api::models::{CreateNoteRequest, StatusMessage, UpdateNoteRequest};
use crate::assistant::Assistant;
use crate::db::{service::DbService, DbPool};

#[get("")]
pub async fn list_notes(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.lock()?;
    let notes = DbService::list_notes(&conn, &user.user_id)?;
    Ok(HttpResponse::Ok().json(notes))
}

#[post("")]
pub async fn create_note(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    assistant: web::Data<Assistant>,
    req: web::Json<CreateNoteRequest>,
) -> Result<HttpResponse, ApiError> {
    const MISSING: &str = "Title and content are required";
    let title = required(&req.title, MISSING)?;
    let content = required(&req.content, MISSING)?;

    // Summary and icon are independent, so generate them side by side
    let (summary, icon) = tokio::join!(
        assistant.summarize(content),
        assistant.classify_icon(content)
    );
    let summary = summary?;

    let conn = pool.lock()?;
    let note = DbService::insert_note(&conn, &user.user_id, title, content, Some(&summary), Some(icon))?;

    info!(note_id = %note.id, user_id = %user.user_id, icon = %icon, "Created note");
    Ok(HttpResponse::Created().json(note))
}

#[get("/{id}")]
pub async fn get_note(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.lock()?;
    let note = DbService::get_note(&conn, &user.user_id, id.into_inner())?
        .ok_or(ApiError::NotFound("Note"))?;
    Ok(HttpResponse::Ok().json(note))
}

#[put("/{id}")]
pub async fn update_note(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    assistant: web::Data<Assistant>,
    id: web::Path<Uuid>,
    req: web::Json<UpdateNoteRequest>,
) -> Result<HttpResponse, ApiError> {
    const MISSING: &str = "Title and content are required";
    let id = id.into_inner();
    let title = required(&req.title, MISSING)?;
    let content = required(&req.content, MISSING)?;

    let existing = {
        let conn = pool.lock()?;
        DbService::get_note(&conn, &user.user_id, id)?.ok_or(ApiError::NotFound("Note"))?
    };

    // The lock is not held across the model call
    let summary = if req.regenerate_summary || content != existing.content {
        Some(assistant.summarize(content).await?)
    } else {
        existing.summary
    };

    let conn = pool.lock()?;
    let note = DbService::update_note(&conn, &user.user_id, id, title, content, summary.as_deref())?
        .ok_or(ApiError::NotFound("Note"))?;
    Ok(HttpResponse::Ok().json(note))
}

#[delete("/{id}")]
pub async fn delete_note(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let conn = pool.lock()?;

    if !DbService::delete_note(&conn, &user.user_id, id)? {
        return Err(ApiError::NotFound("Note"));
    }

    info!(note_id = %id, user_id = %user.user_id, "Deleted note");
    Ok(HttpResponse::Ok().json(StatusMessage {
        message: "Note deleted successfully",
    }))
}

#[post("/{id}/summary")]
pub async fn regenerate_summary(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    assistant: web::Data<Assistant>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let note = {
        let conn = pool.lock()?;
        DbService::get_note(&conn, &user.user_id, id)?.ok_or(ApiError::NotFound("Note"))?
    };

    let summary = assistant.summarize(&note.content).await?;

    let conn = pool.lock()?;
    let note = DbService::set_note_summary(&conn, &user.user_id, id, &summary)?
        .ok_or(ApiError::NotFound("Note"))?;
    Ok(HttpResponse::Ok().json(note))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notes")
            .service(list_notes)
            .service(create_note)
            .service(get_note)
            .service(update_note)
            .service(delete_note)
            .service(regenerate_summary),
    );
}
