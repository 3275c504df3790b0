// src/models/requisition.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::currency;
use crate::domain::validation::{FinanceFields, FinanceSubmission};
use crate::models::ut;

// --- Enums (Mapeando o Postgres) ---

/// Status de uma requisição. O conjunto é fechado: os nomes antigos
/// (`entregue`, `em_financeiro`) só são aceitos na entrada, como `aguardando_lancamento`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "requisition_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequisitionStatus {
    Pendente,
    #[serde(alias = "entregue", alias = "em_financeiro")]
    AguardandoLancamento,
    Lancada,
    Paga,
    Cancelada,
    AbriuChamado,
}

impl RequisitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequisitionStatus::Pendente => "pendente",
            RequisitionStatus::AguardandoLancamento => "aguardando_lancamento",
            RequisitionStatus::Lancada => "lancada",
            RequisitionStatus::Paga => "paga",
            RequisitionStatus::Cancelada => "cancelada",
            RequisitionStatus::AbriuChamado => "abriu_chamado",
        }
    }
}

impl std::fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Requisition {
    pub id: Uuid,

    #[schema(example = "RQ001")]
    pub rq: String,

    #[schema(example = "100.00")]
    pub valor_total: Decimal,

    #[schema(example = "020-johnson-projetos-sjc")]
    pub ut: String,

    #[schema(example = "Troca de lâmpadas do galpão")]
    pub descricao: String,

    #[schema(example = "Almox")]
    pub local: String,

    #[schema(example = "ACME")]
    pub fornecedor: String,

    pub status: RequisitionStatus,

    // Dados do financeiro (preenchidos no envio)
    #[schema(example = "123456")]
    pub nota_fiscal: Option<String>,
    #[schema(example = "OC789")]
    pub oc: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-10")]
    pub data_emissao: Option<NaiveDate>,
    #[serde(rename = "valorNF")]
    #[schema(example = "500.00")]
    pub valor_nf: Option<Decimal>,
    pub nota_fiscal_pdf_url: Option<String>,
    #[schema(example = "Joana Silva")]
    pub usuario_envio: Option<String>,

    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Requisition {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Monta a submissão a partir dos dados financeiros já gravados, para revalidação.
    pub fn finance_submission(&self) -> FinanceSubmission {
        FinanceSubmission {
            nota_fiscal: self.nota_fiscal.clone().unwrap_or_default(),
            oc: self.oc.clone().unwrap_or_default(),
            data_emissao: self
                .data_emissao
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            valor_nf: self.valor_nf,
            fornecedor: self.fornecedor.clone(),
        }
    }
}

// Dados de criação já validados
#[derive(Debug, Clone)]
pub struct NewRequisition {
    pub rq: String,
    pub valor_total: Decimal,
    pub ut: String,
    pub descricao: String,
    pub local: String,
    pub fornecedor: String,
    pub user_id: Uuid,
}

/// Atualização parcial tipada: `None` mantém o valor gravado.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequisitionPatch {
    pub rq: Option<String>,
    pub valor_total: Option<Decimal>,
    pub ut: Option<String>,
    pub descricao: Option<String>,
    pub local: Option<String>,
    pub fornecedor: Option<String>,
    pub status: Option<RequisitionStatus>,
    pub nota_fiscal: Option<String>,
    pub oc: Option<String>,
    pub data_emissao: Option<NaiveDate>,
    pub valor_nf: Option<Decimal>,
    pub nota_fiscal_pdf_url: Option<String>,
    pub usuario_envio: Option<String>,
}

impl RequisitionPatch {
    pub fn with_finance_fields(mut self, fields: FinanceFields) -> Self {
        self.nota_fiscal = Some(fields.nota_fiscal);
        self.oc = Some(fields.oc);
        self.data_emissao = Some(fields.data_emissao);
        self.valor_nf = Some(fields.valor_nf);
        self.fornecedor = Some(fields.fornecedor);
        self
    }

    pub fn touches_core_fields(&self) -> bool {
        self.rq.is_some()
            || self.valor_total.is_some()
            || self.ut.is_some()
            || self.descricao.is_some()
            || self.local.is_some()
    }

    /// Aplica o patch em memória (usado pelo repositório em memória dos testes).
    #[cfg(test)]
    pub fn apply_to(&self, requisition: &mut Requisition) {
        if let Some(v) = &self.rq {
            requisition.rq = v.clone();
        }
        if let Some(v) = self.valor_total {
            requisition.valor_total = v;
        }
        if let Some(v) = &self.ut {
            requisition.ut = v.clone();
        }
        if let Some(v) = &self.descricao {
            requisition.descricao = v.clone();
        }
        if let Some(v) = &self.local {
            requisition.local = v.clone();
        }
        if let Some(v) = &self.fornecedor {
            requisition.fornecedor = v.clone();
        }
        if let Some(v) = self.status {
            requisition.status = v;
        }
        if let Some(v) = &self.nota_fiscal {
            requisition.nota_fiscal = Some(v.clone());
        }
        if let Some(v) = &self.oc {
            requisition.oc = Some(v.clone());
        }
        if let Some(v) = self.data_emissao {
            requisition.data_emissao = Some(v);
        }
        if let Some(v) = self.valor_nf {
            requisition.valor_nf = Some(v);
        }
        if let Some(v) = &self.nota_fiscal_pdf_url {
            requisition.nota_fiscal_pdf_url = Some(v.clone());
        }
        if let Some(v) = &self.usuario_envio {
            requisition.usuario_envio = Some(v.clone());
        }
    }
}

// --- Payloads ---

fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if !currency::fits_storage(*value) {
        let mut err = ValidationError::new("amount_precision");
        err.message = Some("O valor deve ter no máximo duas casas decimais e doze dígitos inteiros.".into());
        return Err(err);
    }
    Ok(())
}

// A RQ é gravada sem espaços nas pontas, então o tamanho vale para o texto aparado.
fn validate_rq(rq: &str) -> Result<(), ValidationError> {
    let len = rq.trim().chars().count();
    if !(1..=10).contains(&len) {
        let mut err = ValidationError::new("length");
        err.message = Some("A RQ deve ter entre 1 e 10 caracteres.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Campo obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequisitionPayload {
    #[validate(custom(function = "validate_rq"))]
    #[schema(example = "RQ001")]
    pub rq: String,

    #[serde(deserialize_with = "currency::deserialize_required")]
    #[validate(custom(function = "validate_amount"))]
    #[schema(value_type = String, example = "1.234,56")]
    pub valor_total: Decimal,

    #[validate(custom(function = "ut::validate_ut"))]
    #[schema(example = "020-johnson-projetos-sjc")]
    pub ut: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub descricao: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Almox")]
    pub local: String,

    #[serde(default)]
    #[schema(example = "ACME")]
    pub fornecedor: String,
}

impl CreateRequisitionPayload {
    pub fn into_new(self, user_id: Uuid) -> NewRequisition {
        NewRequisition {
            rq: self.rq.trim().to_string(),
            valor_total: self.valor_total,
            ut: self.ut,
            descricao: self.descricao.trim().to_string(),
            local: self.local.trim().to_string(),
            fornecedor: self.fornecedor.trim().to_string(),
            user_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequisitionPayload {
    #[validate(custom(function = "validate_rq"))]
    pub rq: Option<String>,

    #[serde(default, deserialize_with = "currency::deserialize_optional")]
    #[validate(custom(function = "validate_amount"))]
    #[schema(value_type = Option<String>, example = "1.234,56")]
    pub valor_total: Option<Decimal>,

    #[validate(custom(function = "ut::validate_ut"))]
    pub ut: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    pub descricao: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    pub local: Option<String>,

    pub fornecedor: Option<String>,
}

impl From<UpdateRequisitionPayload> for RequisitionPatch {
    fn from(p: UpdateRequisitionPayload) -> Self {
        RequisitionPatch {
            rq: p.rq.map(|rq| rq.trim().to_string()),
            valor_total: p.valor_total,
            ut: p.ut,
            descricao: p.descricao.map(|d| d.trim().to_string()),
            local: p.local.map(|l| l.trim().to_string()),
            fornecedor: p.fornecedor.map(|f| f.trim().to_string()),
            ..Default::default()
        }
    }
}

/// Anexo opcional da nota fiscal, em base64 dentro do próprio JSON.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    #[schema(example = "nf-123456.pdf")]
    pub file_name: String,
    #[serde(default = "default_content_type")]
    #[schema(example = "application/pdf")]
    pub content_type: String,
    pub data_base64: String,
}

fn default_content_type() -> String {
    "application/pdf".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSubmissionPayload {
    #[serde(default)]
    #[schema(example = "123456")]
    pub nota_fiscal: String,

    #[serde(default)]
    #[schema(example = "OC789")]
    pub oc: String,

    #[serde(default)]
    #[schema(example = "2024-01-10")]
    pub data_emissao: String,

    #[serde(rename = "valorNF", default, deserialize_with = "currency::deserialize_lenient")]
    #[schema(value_type = Option<String>, example = "500,00")]
    pub valor_nf: Option<Decimal>,

    /// Quando ausente, vale o fornecedor já gravado na requisição.
    #[schema(example = "ACME")]
    pub fornecedor: Option<String>,

    pub nota_fiscal_pdf: Option<AttachmentPayload>,
}

impl FinanceSubmissionPayload {
    pub fn into_parts(self, current: &Requisition) -> (FinanceSubmission, Option<AttachmentPayload>) {
        let submission = FinanceSubmission {
            nota_fiscal: self.nota_fiscal,
            oc: self.oc,
            data_emissao: self.data_emissao,
            valor_nf: self.valor_nf,
            fornecedor: self.fornecedor.unwrap_or_else(|| current.fornecedor.clone()),
        };
        (submission, self.nota_fiscal_pdf)
    }
}

/// Correção de dados financeiros: só os campos presentes mudam.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceCorrectionPayload {
    pub nota_fiscal: Option<String>,
    pub oc: Option<String>,
    pub data_emissao: Option<String>,
    /// Texto que não é valor monetário é recusado; ausente mantém o valor gravado.
    #[serde(rename = "valorNF", default, deserialize_with = "currency::deserialize_optional")]
    #[schema(value_type = Option<String>)]
    pub valor_nf: Option<Decimal>,
    pub fornecedor: Option<String>,
}

impl FinanceCorrectionPayload {
    pub fn merge_into(self, current: FinanceSubmission) -> FinanceSubmission {
        FinanceSubmission {
            nota_fiscal: self.nota_fiscal.unwrap_or(current.nota_fiscal),
            oc: self.oc.unwrap_or(current.oc),
            data_emissao: self.data_emissao.unwrap_or(current.data_emissao),
            valor_nf: self.valor_nf.or(current.valor_nf),
            fornecedor: self.fornecedor.unwrap_or(current.fornecedor),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusPayload {
    pub status: RequisitionStatus,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequisitionFilter {
    /// Filtra por status
    pub status: Option<RequisitionStatus>,
    /// Busca em RQ, descrição, OC e UT
    pub q: Option<String>,
}

// Detalhe de uma requisição com as transições que o usuário pode disparar agora
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionDetail {
    #[serde(flatten)]
    pub requisition: Requisition,
    pub allowed_transitions: Vec<RequisitionStatus>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub aguardando_lancamento: u64,
    pub abriu_chamado: u64,
    pub lancada: u64,
    pub paga: u64,
    pub cancelada: u64,
    pub total: u64,
}
