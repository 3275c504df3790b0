// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::validation::FieldError;
use crate::models::requisition::RequisitionStatus;

// Taxonomia única de erros da aplicação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erros de regra de negócio por campo (ex: envio ao financeiro)
    #[error("Campos inválidos: {0:?}")]
    FieldErrors(Vec<FieldError>),

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Código Klasmat já existe")]
    KlasmatCodeAlreadyExists,

    #[error("Usuário já foi avaliado")]
    UserAlreadyReviewed,

    #[error("Transição inválida: {from} -> {to}")]
    InvalidTransition {
        from: RequisitionStatus,
        to: RequisitionStatus,
    },

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de comunicação externa: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::FieldErrors(errors) => {
                let mut details: HashMap<&'static str, Vec<String>> = HashMap::new();
                for e in errors {
                    details.entry(e.field).or_default().push(e.message);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Forbidden(message) => {
                let body = Json(json!({ "error": message }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }
            AppError::NotFound(entity) => {
                let body = Json(json!({ "error": format!("{} não encontrado(a).", entity) }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::InvalidTransition { from, to } => {
                let body = Json(json!({
                    "error": format!("Não é possível mudar o status de '{}' para '{}'.", from, to),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::KlasmatCodeAlreadyExists => {
                (StatusCode::CONFLICT, "Já existe um item Klasmat com este código.")
            }
            AppError::UserAlreadyReviewed => {
                (StatusCode::CONFLICT, "Este usuário já foi aprovado ou rejeitado.")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),

            // Falhas de persistência e demais erros internos viram 500; o detalhe fica no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn field_errors_are_grouped_by_field() {
        let err = AppError::FieldErrors(vec![
            FieldError::new("notaFiscal", "Nota Fiscal deve conter apenas números"),
            FieldError::new("oc", "OC é obrigatória"),
        ]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["details"]["notaFiscal"][0],
            "Nota Fiscal deve conter apenas números"
        );
        assert_eq!(body["details"]["oc"][0], "OC é obrigatória");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("conexão recusada"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Ocorreu um erro inesperado.");
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::forbidden("x").into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Requisição").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidTransition {
                from: RequisitionStatus::Paga,
                to: RequisitionStatus::Pendente,
            }
            .into_response()
            .status(),
            StatusCode::CONFLICT
        );
    }
}
