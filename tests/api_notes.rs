#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{bearer, ScriptedProvider, ALICE_KEY, BOB_KEY};
use serde_json::{json, Value};
use thoughtsort::db::{service::DbService, Note};
use thoughtsort::icons::IconKind;

#[actix_web::test]
async fn create_note_adds_summary_and_icon() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("A trip plan for Japan.");
    let app = test_app!(pool, provider);

    let req = test::TestRequest::post()
        .uri("/notes")
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Trip", "content": "Planning our vacation to Japan" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let note: Note = test::read_body_json(resp).await;
    assert_eq!(note.icon, Some(IconKind::MapPin));
    assert_eq!(note.summary.as_deref(), Some("A trip plan for Japan."));
    assert_eq!(note.user_id, "alice");

    let conn = pool.lock().unwrap();
    assert!(DbService::get_note(&conn, "alice", note.id).unwrap().is_some());
}

#[actix_web::test]
async fn note_text_is_stored_as_sent() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let req = test::TestRequest::post()
        .uri("/notes")
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "  Code  ", "content": "    fn main() {}\n" }))
        .to_request();
    let note: Note = test::call_and_read_body_json(&app, req).await;
    assert_eq!(note.title, "  Code  ");
    assert_eq!(note.content, "    fn main() {}\n");

    {
        let conn = pool.lock().unwrap();
        let stored = DbService::get_note(&conn, "alice", note.id).unwrap().unwrap();
        assert_eq!(stored.content, "    fn main() {}\n");
    }

    // Identical text is not a content change, so no new summary
    let calls = provider.calls();
    let req = test::TestRequest::put()
        .uri(&format!("/notes/{}", note.id))
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Code", "content": "    fn main() {}\n" }))
        .to_request();
    let updated: Note = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.content, "    fn main() {}\n");
    assert_eq!(provider.calls(), calls);

    // Whitespace-only differences still count as an edit
    let req = test::TestRequest::put()
        .uri(&format!("/notes/{}", note.id))
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Code", "content": "fn main() {}" }))
        .to_request();
    let updated: Note = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.content, "fn main() {}");
    assert_eq!(provider.calls(), calls + 1);
}

#[actix_web::test]
async fn notes_use_camel_case_fields() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let req = test::TestRequest::post()
        .uri("/notes")
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Idea", "content": "An idea" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body.get("createdAt").is_some());
    assert!(body.get("updatedAt").is_some());
    assert_eq!(body["icon"], "Lightbulb");
}

#[actix_web::test]
async fn requests_without_a_valid_key_are_rejected() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let req = test::TestRequest::post()
        .uri("/notes")
        .set_json(json!({ "title": "Trip", "content": "Japan" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/notes")
        .insert_header(bearer("wrong-key"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unauthorized");

    assert_eq!(provider.calls(), 0);
    let conn = pool.lock().unwrap();
    assert!(DbService::list_notes(&conn, "alice").unwrap().is_empty());
}

#[actix_web::test]
async fn missing_fields_are_rejected() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let req = test::TestRequest::post()
        .uri("/notes")
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "   ", "content": "Something" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Title and content are required");
    assert_eq!(provider.calls(), 0);
}

#[actix_web::test]
async fn malformed_note_bodies_get_an_error_body() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let req = test::TestRequest::post()
        .uri("/notes")
        .insert_header(bearer(ALICE_KEY))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"title\": 3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    assert_eq!(provider.calls(), 0);
}

#[actix_web::test]
async fn failed_summary_stores_nothing() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::failing();
    let app = test_app!(pool, provider);

    let req = test::TestRequest::post()
        .uri("/notes")
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Trip", "content": "Japan" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let conn = pool.lock().unwrap();
    assert!(DbService::list_notes(&conn, "alice").unwrap().is_empty());
}

#[actix_web::test]
async fn duplicate_creates_make_distinct_notes() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let mut ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/notes")
            .insert_header(bearer(ALICE_KEY))
            .set_json(json!({ "title": "Same", "content": "Same content" }))
            .to_request();
        let note: Note = test::call_and_read_body_json(&app, req).await;
        ids.push(note.id);
    }
    assert_ne!(ids[0], ids[1]);

    let req = test::TestRequest::get()
        .uri("/notes")
        .insert_header(bearer(ALICE_KEY))
        .to_request();
    let notes: Vec<Note> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(notes.len(), 2);
}

#[actix_web::test]
async fn edit_regenerates_summary_only_when_needed() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let note = {
        let conn = pool.lock().unwrap();
        DbService::insert_note(&conn, "alice", "Trip", "Japan", Some("Old summary"), Some(IconKind::MapPin))
            .unwrap()
    };
    let uri = format!("/notes/{}", note.id);

    // Same content, no flag: summary kept, model untouched
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Trip to Japan", "content": "Japan" }))
        .to_request();
    let updated: Note = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.title, "Trip to Japan");
    assert_eq!(updated.summary.as_deref(), Some("Old summary"));
    assert_eq!(provider.calls(), 0);

    // Changed content: summary regenerated, icon kept
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Trip to Japan", "content": "Japan and Korea" }))
        .to_request();
    let updated: Note = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.summary.as_deref(), Some("Summary."));
    assert_eq!(updated.icon, Some(IconKind::MapPin));
    assert_eq!(provider.calls(), 1);

    // Explicit flag regenerates even when content is unchanged
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(ALICE_KEY))
        .set_json(json!({ "title": "Trip to Japan", "content": "Japan and Korea", "regenerateSummary": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(provider.calls(), 2);
}

#[actix_web::test]
async fn regenerate_summary_endpoint_replaces_summary() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Fresh summary.");
    let app = test_app!(pool, provider);

    let note = {
        let conn = pool.lock().unwrap();
        DbService::insert_note(&conn, "alice", "Trip", "Japan", Some("Old"), None).unwrap()
    };

    let req = test::TestRequest::post()
        .uri(&format!("/notes/{}/summary", note.id))
        .insert_header(bearer(ALICE_KEY))
        .to_request();
    let updated: Note = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.summary.as_deref(), Some("Fresh summary."));
}

#[actix_web::test]
async fn deleted_notes_are_gone() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let note = {
        let conn = pool.lock().unwrap();
        DbService::insert_note(&conn, "alice", "Trip", "Japan", None, None).unwrap()
    };
    let uri = format!("/notes/{}", note.id);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(ALICE_KEY))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Note deleted successfully");

    for req in [
        test::TestRequest::get().uri(&uri),
        test::TestRequest::delete().uri(&uri),
    ] {
        let resp = test::call_service(&app, req.insert_header(bearer(ALICE_KEY)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn notes_are_private_to_their_owner() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let note = {
        let conn = pool.lock().unwrap();
        DbService::insert_note(&conn, "alice", "Diary", "Private thoughts", None, None).unwrap()
    };
    let uri = format!("/notes/{}", note.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(BOB_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(BOB_KEY))
        .set_json(json!({ "title": "Mine now", "content": "Private thoughts" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/notes")
        .insert_header(bearer(BOB_KEY))
        .to_request();
    let notes: Vec<Note> = test::call_and_read_body_json(&app, req).await;
    assert!(notes.is_empty());

    let conn = pool.lock().unwrap();
    let stored = DbService::get_note(&conn, "alice", note.id).unwrap().unwrap();
    assert_eq!(stored.title, "Diary");
}

#[actix_web::test]
async fn malformed_ids_are_not_found() {
    let pool = common::test_pool();
    let provider = ScriptedProvider::replying("Summary.");
    let app = test_app!(pool, provider);

    let req = test::TestRequest::get()
        .uri("/notes/not-a-uuid")
        .insert_header(bearer(ALICE_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
