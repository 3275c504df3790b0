// src/handlers/uts.rs

use axum::Json;

use crate::models::ut::{WorkUnit, WORK_UNITS};

#[utoipa::path(
    get,
    path = "/api/uts",
    tag = "UTs",
    responses((status = 200, description = "Unidades de trabalho disponíveis", body = Vec<WorkUnit>))
)]
pub async fn list_uts() -> Json<&'static [WorkUnit]> {
    Json(WORK_UNITS)
}
