use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use stockroom_api::{
    app_router,
    config::{AppConfig, RemoveMissingPolicy},
    db, AppState,
};
use tower::util::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: true,
        cors_allowed_origins: None,
        remove_missing: RemoveMissingPolicy::Error,
        export_logo_path: None,
    }
}

async fn test_app_with(config: AppConfig) -> Router {
    let pool = db::connect_single("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");
    app_router(AppState::new(Arc::new(pool), config))
}

async fn test_app() -> Router {
    test_app_with(test_config()).await
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn add_creates_then_updates() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "123", "quantity": 5, "name": "Widget"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "created");
    assert_eq!(body["record"]["quantity"], 5);
    assert_eq!(body["record"]["name"], "Widget");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "123", "quantity": 3}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "updated");
    assert_eq!(body["record"]["quantity"], 8);
}

#[tokio::test]
async fn remove_drains_row_and_reports_deleted() {
    let app = test_app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "123", "quantity": 8}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory/remove",
            json!({"barcode": "123", "quantity": 8}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "deleted");

    let response = app.clone().oneshot(get_request("/inventory")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn remove_unknown_barcode_is_404() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory/remove",
            json!({"barcode": "999", "quantity": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not Found");

    // No log entry was appended.
    let response = app
        .clone()
        .oneshot(get_request("/inventory/logs"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn non_positive_quantity_is_400() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "123", "quantity": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "", "quantity": 5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logs_are_newest_first() {
    let app = test_app().await;

    for (barcode, qty) in [("123", 5), ("123", 3)] {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/inventory/add",
                json!({"barcode": barcode, "quantity": qty}),
            ))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(json_request(
            "POST",
            "/inventory/remove",
            json!({"barcode": "123", "quantity": 8}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/inventory/logs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["action"], "Removed");
    assert_eq!(entries[0]["quantity"], 8);
    assert_eq!(entries[2]["action"], "Added");
    assert_eq!(entries[2]["quantity"], 5);
}

#[tokio::test]
async fn delete_by_barcode_reports_whether_removed() {
    let app = test_app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "abc", "quantity": 2}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/inventory/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["deleted"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/inventory/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["deleted"], false);
}

#[tokio::test]
async fn reset_empties_both_tables() {
    let app = test_app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "abc", "quantity": 2}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/inventory/reset", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let inventory = body_json(app.clone().oneshot(get_request("/inventory")).await.unwrap()).await;
    assert_eq!(inventory.as_array().unwrap().len(), 0);
    let logs = body_json(
        app.clone()
            .oneshot(get_request("/inventory/logs"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(logs.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn xlsx_export_returns_a_workbook() {
    let app = test_app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "123", "quantity": 5}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/inventory/export.xlsx"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // XLSX is a zip container.
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[tokio::test]
async fn xlsx_export_skips_an_unreadable_logo() {
    let mut config = test_config();
    config.export_logo_path = Some("/nonexistent/logo.png".to_string());
    let app = test_app_with(config).await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/inventory/add",
            json!({"barcode": "123", "quantity": 5}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/inventory/export.xlsx"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[tokio::test]
async fn pdf_export_returns_a_document() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/inventory/export.pdf"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..5], b"%PDF-");
}

#[tokio::test]
async fn health_reports_up() {
    let app = test_app().await;

    let response = app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "up");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = test_app().await;

    let response = app.clone().oneshot(get_request("/inventory")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/inventory")
                .header("x-request-id", "test-id-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "test-id-42");
}
