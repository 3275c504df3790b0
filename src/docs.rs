// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::domain;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::update_user_status,

        // --- UTs ---
        handlers::uts::list_uts,

        // --- Requisitions ---
        handlers::requisitions::list_requisitions,
        handlers::requisitions::create_requisition,
        handlers::requisitions::get_requisition,
        handlers::requisitions::update_requisition,
        handlers::requisitions::delete_requisition,
        handlers::requisitions::submit_to_finance,
        handlers::requisitions::correct_finance,
        handlers::requisitions::change_status,

        // --- Finance ---
        handlers::finance::finance_queue,
        handlers::finance::finance_summary,

        // --- Klasmat ---
        handlers::klasmat::list_items,
        handlers::klasmat::create_item,
        handlers::klasmat::approve_item,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserStatus,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::ReviewDecision,
            models::auth::UpdateUserStatusPayload,
            domain::roles::Capability,

            // --- UTs ---
            models::ut::WorkUnit,

            // --- Requisitions ---
            models::requisition::RequisitionStatus,
            models::requisition::Requisition,
            models::requisition::RequisitionDetail,
            models::requisition::CreateRequisitionPayload,
            models::requisition::UpdateRequisitionPayload,
            models::requisition::AttachmentPayload,
            models::requisition::FinanceSubmissionPayload,
            models::requisition::FinanceCorrectionPayload,
            models::requisition::ChangeStatusPayload,
            models::requisition::FinanceSummary,
            domain::validation::FieldError,

            // --- Klasmat ---
            models::klasmat::KlasmatCategory,
            models::klasmat::KlasmatItem,
            models::klasmat::CreateKlasmatPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Aprovação de cadastros"),
        (name = "UTs", description = "Unidades de trabalho"),
        (name = "Requisitions", description = "Requisições e envio ao financeiro"),
        (name = "Finance", description = "Fila e indicadores do financeiro"),
        (name = "Klasmat", description = "Catálogo de classificação de peças")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
