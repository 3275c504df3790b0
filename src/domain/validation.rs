// src/domain/validation.rs

//! Regras para o envio de uma requisição ao financeiro.
//!
//! Todas as regras rodam sempre (sem curto-circuito) para que a interface
//! mostre todos os problemas de uma vez, e a função é pura: pode ser chamada
//! a cada alteração de campo.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::currency;

static DIGITS_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static HAS_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]").unwrap());
static HAS_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Nome do campo no contrato (`notaFiscal`, `oc`, `dataEmissao`, `valorNF`, `fornecedor`)
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Dados financeiros como digitados, antes da validação.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinanceSubmission {
    pub nota_fiscal: String,
    pub oc: String,
    pub data_emissao: String,
    pub valor_nf: Option<Decimal>,
    pub fornecedor: String,
}

/// Dados financeiros já validados e tipados, prontos para gravação.
#[derive(Debug, Clone, PartialEq)]
pub struct FinanceFields {
    pub nota_fiscal: String,
    pub oc: String,
    pub data_emissao: NaiveDate,
    pub valor_nf: Decimal,
    pub fornecedor: String,
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

pub fn validate_for_finance_submission(submission: &FinanceSubmission) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let nota_fiscal = submission.nota_fiscal.trim();
    if nota_fiscal.is_empty() {
        errors.push(FieldError::new("notaFiscal", "Nota Fiscal é obrigatória"));
    } else if !DIGITS_ONLY.is_match(nota_fiscal) {
        errors.push(FieldError::new("notaFiscal", "Nota Fiscal deve conter apenas números"));
    }

    let oc = submission.oc.trim();
    if oc.is_empty() {
        errors.push(FieldError::new("oc", "OC é obrigatória"));
    } else if !(HAS_LETTER.is_match(oc) && HAS_DIGIT.is_match(oc)) {
        errors.push(FieldError::new("oc", "OC deve conter letras e números"));
    }

    let data_emissao = submission.data_emissao.trim();
    if data_emissao.is_empty() {
        errors.push(FieldError::new("dataEmissao", "Data de emissão é obrigatória"));
    } else if parse_date(data_emissao).is_none() {
        errors.push(FieldError::new("dataEmissao", "Data de emissão inválida"));
    }

    match submission.valor_nf {
        Some(v) if v <= Decimal::ZERO => {
            errors.push(FieldError::new("valorNF", "Valor da NF deve ser maior que zero"))
        }
        None => errors.push(FieldError::new("valorNF", "Valor da NF deve ser maior que zero")),
        Some(v) if !currency::fits_storage(v) => errors.push(FieldError::new(
            "valorNF",
            "Valor da NF deve ter no máximo duas casas decimais e doze dígitos inteiros",
        )),
        Some(_) => {}
    }

    if submission.fornecedor.trim().is_empty() {
        errors.push(FieldError::new("fornecedor", "Fornecedor é obrigatório"));
    }

    errors
}

impl FinanceSubmission {
    /// Valida e converte. Nada é gravado quando há erro.
    pub fn into_fields(self) -> Result<FinanceFields, Vec<FieldError>> {
        let errors = validate_for_finance_submission(&self);
        if !errors.is_empty() {
            return Err(errors);
        }

        match (parse_date(&self.data_emissao), self.valor_nf) {
            (Some(data_emissao), Some(valor_nf)) => Ok(FinanceFields {
                nota_fiscal: self.nota_fiscal.trim().to_string(),
                oc: self.oc.trim().to_string(),
                data_emissao,
                valor_nf,
                fornecedor: self.fornecedor.trim().to_string(),
            }),
            // Já coberto pela validação acima
            _ => Err(vec![FieldError::new("dataEmissao", "Data de emissão inválida")]),
        }
    }
}
