// src/handlers/users.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{UpdateUserStatusPayload, User, UserStatus},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// `pending` para a fila de aprovação
    pub status: Option<UserStatus>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Usuários (exceto admins), mais recentes primeiro", body = Vec<User>),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = app_state
        .auth_service
        .list_users(&user.session(), query.status)
        .await?;
    Ok(Json(users))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    tag = "Users",
    request_body = UpdateUserStatusPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário aprovado ou rejeitado", body = User),
        (status = 400, description = "Papel informado junto com rejeição"),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "Usuário já avaliado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatusPayload>,
) -> Result<Json<User>, AppError> {
    let updated = app_state
        .auth_service
        .set_user_status(&user.session(), id, payload.status, payload.role)
        .await?;
    Ok(Json(updated))
}
