// src/handlers/klasmat.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::klasmat::{CreateKlasmatPayload, KlasmatFilter, KlasmatItem},
};

#[utoipa::path(
    get,
    path = "/api/klasmat",
    tag = "Klasmat",
    params(KlasmatFilter),
    responses((status = 200, description = "Catálogo visível (não-admins só veem aprovados)", body = Vec<KlasmatItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<KlasmatFilter>,
) -> Result<Json<Vec<KlasmatItem>>, AppError> {
    let items = app_state.klasmat_service.list(&user.session(), &filter).await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/klasmat",
    tag = "Klasmat",
    request_body = CreateKlasmatPayload,
    responses(
        (status = 201, description = "Item cadastrado, aguardando aprovação", body = KlasmatItem),
        (status = 409, description = "Código já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateKlasmatPayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.klasmat_service.create(&user.session(), payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    post,
    path = "/api/klasmat/{code}/approve",
    tag = "Klasmat",
    params(("code" = String, Path, description = "Código Klasmat")),
    responses(
        (status = 200, description = "Item aprovado", body = KlasmatItem),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Código não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(code): Path<String>,
) -> Result<Json<KlasmatItem>, AppError> {
    let item = app_state.klasmat_service.approve(&user.session(), &code).await?;
    Ok(Json(item))
}
