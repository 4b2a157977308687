use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use super::documents::DocumentListResponse;
use super::{build_router, AppState};
use crate::cache::MemoryCache;
use crate::db::repositories::{SqlxCurriculumRepository, SqlxDocumentRepository};
use crate::db::{create_test_pool, migrations};
use crate::models::{AdminStats, CreateDocumentInput, Curriculum, Document, DocumentStatus};
use crate::services::{CurriculumService, ReviewService};

async fn test_state() -> AppState {
    crate::logging::init_test();

    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool).await.expect("Failed to run migrations");

    let cache = Arc::new(MemoryCache::new());
    let review_service = Arc::new(ReviewService::new(
        SqlxDocumentRepository::boxed(pool.clone()),
        cache,
    ));
    let curriculum_service = Arc::new(CurriculumService::new(SqlxCurriculumRepository::boxed(
        pool.clone(),
    )));

    AppState {
        pool,
        review_service,
        curriculum_service,
    }
}

fn test_server(state: AppState) -> TestServer {
    let router = build_router(state, "http://localhost:3000").expect("Failed to build router");
    TestServer::new(router).expect("Failed to start test server")
}

async fn seed_document(state: &AppState, title: &str) -> Document {
    state
        .review_service
        .submit(CreateDocumentInput {
            title: title.to_string(),
            student_name: "Joana Lima".to_string(),
        })
        .await
        .expect("Failed to seed document")
}

#[tokio::test]
async fn test_approve_moves_pending_to_approved() {
    let state = test_state().await;
    let doc = seed_document(&state, "Week 1").await;
    let server = test_server(state);

    let response = server.post(&format!("/api/documents/{}/approve", doc.id)).await;
    response.assert_status_ok();

    let body: Document = response.json();
    assert_eq!(body.id, doc.id);
    assert_eq!(body.status, DocumentStatus::Approved);
    assert!(body.reviewed_at.is_some());
}

#[tokio::test]
async fn test_reject_moves_pending_to_rejected() {
    let state = test_state().await;
    let doc = seed_document(&state, "Week 2").await;
    let server = test_server(state);

    let response = server.post(&format!("/api/documents/{}/reject", doc.id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Document>().status, DocumentStatus::Rejected);
}

#[tokio::test]
async fn test_reviewing_terminal_document_conflicts() {
    let state = test_state().await;
    let doc = seed_document(&state, "Week 3").await;
    let server = test_server(state);

    server
        .post(&format!("/api/documents/{}/reject", doc.id))
        .await
        .assert_status_ok();

    let response = server.post(&format!("/api/documents/{}/approve", doc.id)).await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["details"]["status"], "rejected");

    let current: Document = server.get(&format!("/api/documents/{}", doc.id)).await.json();
    assert_eq!(current.status, DocumentStatus::Rejected);
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let server = test_server(test_state().await);

    for path in [
        "/api/documents/missing/approve",
        "/api/documents/missing/reject",
    ] {
        let response = server.post(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    server
        .get("/api/documents/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_reflect_reviews_immediately() {
    let state = test_state().await;
    let first = seed_document(&state, "A").await;
    seed_document(&state, "B").await;
    let server = test_server(state);

    let before: AdminStats = server.get("/api/admin/stats").await.json();
    assert_eq!((before.total, before.pending, before.approved), (2, 2, 0));

    server
        .post(&format!("/api/documents/{}/approve", first.id))
        .await
        .assert_status_ok();

    let after: AdminStats = server.get("/api/admin/stats").await.json();
    assert_eq!((after.total, after.pending, after.approved), (2, 1, 1));
}

#[tokio::test]
async fn test_list_documents_filters_by_status() {
    let state = test_state().await;
    let doc = seed_document(&state, "A").await;
    seed_document(&state, "B").await;
    let server = test_server(state);

    server
        .post(&format!("/api/documents/{}/approve", doc.id))
        .await
        .assert_status_ok();

    let all: DocumentListResponse = server.get("/api/documents").await.json();
    assert_eq!(all.documents.len(), 2);

    let approved: DocumentListResponse = server
        .get("/api/documents")
        .add_query_param("status", "approved")
        .await
        .json();
    assert_eq!(approved.documents.len(), 1);
    assert_eq!(approved.documents[0].id, doc.id);

    server
        .get("/api/documents")
        .add_query_param("status", "archived")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_and_clear_curriculum_cap() {
    let state = test_state().await;
    let curriculum = state
        .curriculum_service
        .create("Nursing", None)
        .await
        .expect("Failed to seed curriculum");
    let server = test_server(state);
    let path = format!("/api/curriculums/{}/max-credits", curriculum.id);

    let capped = server.put(&path).json(&json!({ "max_credits": 120 })).await;
    capped.assert_status_ok();
    assert_eq!(capped.json::<Curriculum>().max_credits, Some(120));

    let cleared = server.put(&path).json(&json!({ "max_credits": null })).await;
    cleared.assert_status_ok();
    assert_eq!(cleared.json::<Curriculum>().max_credits, None);

    let listed: Value = server.get("/api/curriculums").await.json();
    assert_eq!(listed["curriculums"][0]["max_credits"], Value::Null);
}

#[tokio::test]
async fn test_invalid_curriculum_cap_requests() {
    let state = test_state().await;
    let curriculum = state
        .curriculum_service
        .create("Pharmacy", Some(60))
        .await
        .expect("Failed to seed curriculum");
    let server = test_server(state);

    let negative = server
        .put(&format!("/api/curriculums/{}/max-credits", curriculum.id))
        .json(&json!({ "max_credits": -3 }))
        .await;
    negative.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(negative.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

    server
        .put("/api/curriculums/9999/max-credits")
        .json(&json!({ "max_credits": 10 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_cors_origin_is_rejected() {
    let state = test_state().await;
    assert!(build_router(state, "not a\nheader").is_err());
}

#[tokio::test]
async fn test_health_reports_database_driver() {
    let server = test_server(test_state().await);

    let response = server.get("/api/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok", "database": "sqlite" }));
}

#[tokio::test]
async fn test_health_unavailable_after_pool_closed() {
    let state = test_state().await;
    let pool = state.pool.clone();
    let server = test_server(state);
    pool.close().await;

    let response = server.get("/api/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unavailable");
    assert!(body["error"].is_string());
}
