pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub inventory_service: services::inventory::InventoryService,
    pub export_service: services::export::ExportService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let inventory_service =
            services::inventory::InventoryService::new(db.clone(), config.remove_missing);
        let export_service = services::export::ExportService::new(
            inventory_service.clone(),
            config.export_logo_path.clone(),
        );
        Self {
            db,
            config,
            inventory_service,
            export_service,
        }
    }
}

/// Builds the full application router: status, health, OpenAPI document, and
/// the inventory surface. Transport-level layers (CORS, compression,
/// timeouts) are applied by the binary.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_status))
        .route("/health", get(handlers::health::health))
        .route("/openapi.json", get(openapi::openapi_json))
        .nest(
            "/inventory",
            handlers::inventory::inventory_routes().merge(handlers::export::export_routes()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}
