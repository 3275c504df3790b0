// src/handlers/requisitions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::requisition::{
        ChangeStatusPayload, CreateRequisitionPayload, FinanceCorrectionPayload, FinanceSubmissionPayload,
        Requisition, RequisitionDetail, RequisitionFilter, UpdateRequisitionPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/requisitions",
    tag = "Requisitions",
    params(RequisitionFilter),
    responses((status = 200, description = "Requisições visíveis para o usuário", body = Vec<Requisition>)),
    security(("api_jwt" = []))
)]
pub async fn list_requisitions(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<RequisitionFilter>,
) -> Result<Json<Vec<Requisition>>, AppError> {
    let rows = app_state
        .requisition_service
        .list(&user.session(), &filter)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/requisitions",
    tag = "Requisitions",
    request_body = CreateRequisitionPayload,
    responses(
        (status = 201, description = "Requisição criada como pendente", body = Requisition),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Perfil sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_requisition(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateRequisitionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let requisition = app_state
        .requisition_service
        .create(&user.session(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(requisition)))
}

#[utoipa::path(
    get,
    path = "/api/requisitions/{id}",
    tag = "Requisitions",
    params(("id" = Uuid, Path, description = "ID da requisição")),
    responses(
        (status = 200, description = "Requisição e transições permitidas", body = RequisitionDetail),
        (status = 404, description = "Não encontrada ou fora da visibilidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_requisition(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequisitionDetail>, AppError> {
    let detail = app_state.requisition_service.get(&user.session(), id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/api/requisitions/{id}",
    tag = "Requisitions",
    request_body = UpdateRequisitionPayload,
    params(("id" = Uuid, Path, description = "ID da requisição")),
    responses(
        (status = 200, description = "Requisição atualizada", body = Requisition),
        (status = 403, description = "Sem permissão ou requisição fora de pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_requisition(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequisitionPayload>,
) -> Result<Json<Requisition>, AppError> {
    payload.validate()?;

    let updated = app_state
        .requisition_service
        .update(&user.session(), id, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/requisitions/{id}",
    tag = "Requisitions",
    params(("id" = Uuid, Path, description = "ID da requisição")),
    responses(
        (status = 204, description = "Requisição excluída"),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_requisition(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.requisition_service.delete(&user.session(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/finance",
    tag = "Requisitions",
    request_body = FinanceSubmissionPayload,
    params(("id" = Uuid, Path, description = "ID da requisição")),
    responses(
        (status = 200, description = "Enviada ao financeiro", body = Requisition),
        (status = 400, description = "Erros de validação por campo"),
        (status = 409, description = "Requisição não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_to_finance(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FinanceSubmissionPayload>,
) -> Result<Json<Requisition>, AppError> {
    let updated = app_state
        .requisition_service
        .submit_to_finance(&user.session(), id, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/requisitions/{id}/finance",
    tag = "Requisitions",
    request_body = FinanceCorrectionPayload,
    params(("id" = Uuid, Path, description = "ID da requisição")),
    responses(
        (status = 200, description = "Dados financeiros corrigidos", body = Requisition),
        (status = 400, description = "Erros de validação por campo"),
        (status = 403, description = "Sem permissão ou já lançada")
    ),
    security(("api_jwt" = []))
)]
pub async fn correct_finance(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FinanceCorrectionPayload>,
) -> Result<Json<Requisition>, AppError> {
    let updated = app_state
        .requisition_service
        .correct_finance(&user.session(), id, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/requisitions/{id}/status",
    tag = "Requisitions",
    request_body = ChangeStatusPayload,
    params(("id" = Uuid, Path, description = "ID da requisição")),
    responses(
        (status = 200, description = "Status alterado", body = Requisition),
        (status = 403, description = "Perfil sem permissão"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<Json<Requisition>, AppError> {
    let updated = app_state
        .requisition_service
        .change_status(&user.session(), id, payload.status)
        .await?;
    Ok(Json(updated))
}
