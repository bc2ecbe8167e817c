use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::errors::ServiceError;
use crate::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/export.xlsx", get(export_xlsx))
        .route("/export.pdf", get(export_pdf))
}

/// Spreadsheet projection of the inventory and activity log
#[utoipa::path(
    get,
    path = "/inventory/export.xlsx",
    responses(
        (status = 200, description = "XLSX workbook", body = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 500, description = "Export failed", body = crate::errors::ErrorResponse)
    ),
    tag = "export"
)]
pub async fn export_xlsx(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let bytes = state.export_service.workbook().await?;
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory.xlsx\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// PDF projection of the inventory and activity log
#[utoipa::path(
    get,
    path = "/inventory/export.pdf",
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 500, description = "Export failed", body = crate::errors::ErrorResponse)
    ),
    tag = "export"
)]
pub async fn export_pdf(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let bytes = state.export_service.pdf().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory.pdf\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
