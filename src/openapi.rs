use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "stockroom-api",
        description = "Barcode inventory ledger with an append-only activity log"
    ),
    paths(
        crate::handlers::inventory::add_item,
        crate::handlers::inventory::remove_item,
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::list_activity,
        crate::handlers::inventory::delete_by_barcode,
        crate::handlers::inventory::delete_by_id,
        crate::handlers::inventory::reset_all,
        crate::handlers::export::export_xlsx,
        crate::handlers::export::export_pdf,
        crate::handlers::health::health,
    ),
    components(schemas(
        crate::handlers::inventory::AddItemRequest,
        crate::handlers::inventory::RemoveItemRequest,
        crate::handlers::inventory::InventoryRecord,
        crate::handlers::inventory::ActivityRecord,
        crate::handlers::inventory::ApplyResponse,
        crate::errors::ErrorResponse,
    )),
    tags(
        (name = "inventory", description = "Quantity reconciliation and snapshots"),
        (name = "export", description = "Read-only projections"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
