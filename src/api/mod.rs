pub mod chat;
pub mod chats;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notes;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

pub use error::ApiError;
pub use middleware::{ApiKeyAuth, AuthenticatedUser};

/// Parses an optional id sent as text; blank means absent.
pub(crate) fn parse_optional_id(raw: Option<&str>) -> Result<Option<uuid::Uuid>, uuid::Error> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some),
        None => Ok(None),
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Invalid request body: {}", err)).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error));
    notes::configure(cfg);
    chats::configure(cfg);
    chat::configure(cfg);
}
