// src/domain/currency.rs

//! Valores monetários em reais (BRL).
//!
//! Um campo de moeda vive em duas formas: a de exibição (`R$ 1.234,56`) e a
//! editável (`1234.56`). Ambas voltam para o mesmo `Decimal`, e
//! `parse(format_brl(x)) == x` para qualquer valor não negativo com até duas
//! casas decimais.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer, Visitor};

/// Converte texto digitado (ou exibido) em valor.
///
/// Aceita `,` ou `.` como separador decimal. Quando há vírgula, os pontos são
/// separadores de milhar (`1.234,56`); sem vírgula, um único ponto é decimal
/// (`1234.56`) e vários pontos são agrupamento (`1.234.567`).
/// Retorna `None` para texto vazio, negativo ou com caracteres estranhos.
pub fn parse(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        if cleaned.matches(',').count() > 1 {
            return None;
        }
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

// Colunas `NUMERIC(14, 2)`: doze dígitos inteiros
const STORAGE_LIMIT: i64 = 1_000_000_000_000;

/// O valor cabe numa coluna de moeda sem arredondar nem estourar:
/// no máximo duas casas decimais e menos de 10^12.
pub fn fits_storage(value: Decimal) -> bool {
    value.normalize().scale() <= 2 && value.abs() < Decimal::from(STORAGE_LIMIT)
}

/// Forma de exibição: `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, frac_part)
}

/// Forma editável: `1234.56`. Usada quando o campo ganha foco.
pub fn to_editable(display: &str) -> Option<String> {
    parse(display).map(|v| format!("{:.2}", v))
}

// ---
// Desserialização: aceita número JSON ou texto localizado
// ---

enum Parsed {
    Missing,
    Invalid(String),
    Value(Decimal),
}

struct CurrencyVisitor;

impl<'de> Visitor<'de> for CurrencyVisitor {
    type Value = Parsed;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("um valor monetário (número ou texto como \"1.234,56\")")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Parsed, E> {
        Ok(match parse(v) {
            Some(d) => Parsed::Value(d),
            None if v.trim().is_empty() => Parsed::Missing,
            None => Parsed::Invalid(v.to_string()),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Parsed, E> {
        Ok(match Decimal::from_f64(v) {
            Some(d) => Parsed::Value(d),
            None => Parsed::Invalid(v.to_string()),
        })
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Parsed, E> {
        Ok(Parsed::Value(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Parsed, E> {
        Ok(Parsed::Value(Decimal::from(v)))
    }

    fn visit_none<E: de::Error>(self) -> Result<Parsed, E> {
        Ok(Parsed::Missing)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Parsed, E> {
        Ok(Parsed::Missing)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Parsed, D::Error> {
        d.deserialize_any(CurrencyVisitor)
    }
}

/// Campo obrigatório: texto inválido ou ausente é erro de formato.
pub fn deserialize_required<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    match d.deserialize_any(CurrencyVisitor)? {
        Parsed::Value(v) => Ok(v),
        Parsed::Missing => Err(de::Error::custom("valor monetário obrigatório")),
        Parsed::Invalid(raw) => Err(de::Error::custom(format!("valor monetário inválido: {}", raw))),
    }
}

/// Campo opcional de atualização: ausente é `None`, inválido é erro.
pub fn deserialize_optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    match d.deserialize_any(CurrencyVisitor)? {
        Parsed::Value(v) => Ok(Some(v)),
        Parsed::Missing => Ok(None),
        Parsed::Invalid(raw) => Err(de::Error::custom(format!("valor monetário inválido: {}", raw))),
    }
}

/// Campo sujeito à validação de negócio: qualquer coisa que não seja um valor
/// vira `None` e a regra de validação reporta o problema junto com os demais.
pub fn deserialize_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    match d.deserialize_any(CurrencyVisitor)? {
        Parsed::Value(v) => Ok(Some(v)),
        Parsed::Missing | Parsed::Invalid(_) => Ok(None),
    }
}
