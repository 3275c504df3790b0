// src/handlers/finance.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::requisition::{FinanceSummary, Requisition, RequisitionFilter},
};

#[utoipa::path(
    get,
    path = "/api/finance/requisitions",
    tag = "Finance",
    params(RequisitionFilter),
    responses(
        (status = 200, description = "Requisições no fluxo financeiro", body = Vec<Requisition>),
        (status = 403, description = "Perfil sem acesso à fila")
    ),
    security(("api_jwt" = []))
)]
pub async fn finance_queue(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<RequisitionFilter>,
) -> Result<Json<Vec<Requisition>>, AppError> {
    let rows = app_state
        .requisition_service
        .finance_queue(&user.session(), &filter)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/finance/summary",
    tag = "Finance",
    responses(
        (status = 200, description = "Contagem por status financeiro", body = FinanceSummary),
        (status = 403, description = "Perfil sem acesso à fila")
    ),
    security(("api_jwt" = []))
)]
pub async fn finance_summary(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<FinanceSummary>, AppError> {
    let summary = app_state.requisition_service.finance_summary(&user.session()).await?;
    Ok(Json(summary))
}
