use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{activity_log, inventory_item};
use crate::errors::ServiceError;
use crate::services::inventory::{ApplyOutcome, ApplyRequest, StockAction};
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddItemRequest {
    #[validate(length(min = 1, message = "barcode must not be empty"))]
    pub barcode: String,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: i32,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveItemRequest {
    #[validate(length(min = 1, message = "barcode must not be empty"))]
    pub barcode: String,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryRecord {
    pub id: i32,
    pub barcode: String,
    pub name: Option<String>,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<inventory_item::Model> for InventoryRecord {
    fn from(model: inventory_item::Model) -> Self {
        Self {
            id: model.id,
            barcode: model.barcode,
            name: model.name,
            quantity: model.quantity,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityRecord {
    pub id: i32,
    pub barcode: String,
    pub action: String,
    pub quantity: i32,
    pub time: DateTime<Utc>,
}

impl From<activity_log::Model> for ActivityRecord {
    fn from(model: activity_log::Model) -> Self {
        Self {
            id: model.id,
            barcode: model.barcode,
            action: model.action.as_str().to_string(),
            quantity: model.quantity,
            time: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyResponse {
    /// One of "created", "updated", "deleted", "ignored"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<InventoryRecord>,
    pub barcode: String,
}

/// Routes for the inventory surface, mounted under `/inventory`.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/add", post(add_item))
        .route("/remove", post(remove_item))
        .route("/logs", get(list_activity))
        .route("/reset", post(reset_all))
        .route("/id/{id}", delete(delete_by_id))
        .route("/{barcode}", delete(delete_by_barcode))
}

/// Add stock for a barcode, creating the row on first sight
#[utoipa::path(
    post,
    path = "/inventory/add",
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Inventory row created", body = ApplyResponse),
        (status = 200, description = "Existing row incremented", body = ApplyResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let outcome = state
        .inventory_service
        .apply(ApplyRequest {
            barcode: payload.barcode,
            action: StockAction::Add,
            quantity: payload.quantity,
            name: payload.name,
        })
        .await?;
    Ok(apply_response(outcome))
}

/// Remove stock for a barcode, deleting the row when it drains
#[utoipa::path(
    post,
    path = "/inventory/remove",
    request_body = RemoveItemRequest,
    responses(
        (status = 200, description = "Row updated, deleted, or ignored", body = ApplyResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown barcode under the strict policy", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Json(payload): Json<RemoveItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let outcome = state
        .inventory_service
        .apply(ApplyRequest {
            barcode: payload.barcode,
            action: StockAction::Remove,
            quantity: payload.quantity,
            name: None,
        })
        .await?;
    Ok(apply_response(outcome))
}

/// Current inventory snapshot, newest row first
#[utoipa::path(
    get,
    path = "/inventory",
    responses(
        (status = 200, description = "Inventory snapshot", body = [InventoryRecord]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.inventory_service.snapshot().await?;
    let records: Vec<InventoryRecord> = items.into_iter().map(Into::into).collect();
    Ok(Json(records))
}

/// Activity log, newest entry first
#[utoipa::path(
    get,
    path = "/inventory/logs",
    responses(
        (status = 200, description = "Activity log", body = [ActivityRecord]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_activity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let entries = state.inventory_service.activity().await?;
    let records: Vec<ActivityRecord> = entries.into_iter().map(Into::into).collect();
    Ok(Json(records))
}

/// Unconditionally delete a row by barcode
#[utoipa::path(
    delete,
    path = "/inventory/{barcode}",
    params(("barcode" = String, Path, description = "Barcode to delete")),
    responses(
        (status = 200, description = "Delete attempted; body reports whether a row was removed"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let removed = state.inventory_service.delete_by_barcode(&barcode).await?;
    Ok(Json(json!({ "deleted": removed, "barcode": barcode })))
}

/// Unconditionally delete a row by id
#[utoipa::path(
    delete,
    path = "/inventory/id/{id}",
    params(("id" = i32, Path, description = "Row id to delete")),
    responses(
        (status = 200, description = "Delete attempted; body reports whether a row was removed"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let removed = state.inventory_service.delete_by_id(id).await?;
    Ok(Json(json!({ "deleted": removed, "id": id })))
}

/// Clear both tables
#[utoipa::path(
    post,
    path = "/inventory/reset",
    responses(
        (status = 200, description = "Inventory and activity log cleared"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn reset_all(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    state.inventory_service.reset().await?;
    Ok(Json(json!({ "reset": true })))
}

fn apply_response(outcome: ApplyOutcome) -> (StatusCode, Json<ApplyResponse>) {
    match outcome {
        ApplyOutcome::Created(item) => {
            let barcode = item.barcode.clone();
            (
                StatusCode::CREATED,
                Json(ApplyResponse {
                    status: "created".to_string(),
                    record: Some(item.into()),
                    barcode,
                }),
            )
        }
        ApplyOutcome::Updated(item) => {
            let barcode = item.barcode.clone();
            (
                StatusCode::OK,
                Json(ApplyResponse {
                    status: "updated".to_string(),
                    record: Some(item.into()),
                    barcode,
                }),
            )
        }
        ApplyOutcome::Deleted { barcode } => (
            StatusCode::OK,
            Json(ApplyResponse {
                status: "deleted".to_string(),
                record: None,
                barcode,
            }),
        ),
        ApplyOutcome::Ignored { barcode } => (
            StatusCode::OK,
            Json(ApplyResponse {
                status: "ignored".to_string(),
                record: None,
                barcode,
            }),
        ),
    }
}
