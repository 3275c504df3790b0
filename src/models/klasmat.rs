// src/models/klasmat.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "klasmat_category", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum KlasmatCategory {
    Civil,
    Eletrica,
    Hidraulica,
    Serralheria,
    Pintura,
}

/// Item do catálogo de classificação de peças. O código é a chave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KlasmatItem {
    #[schema(example = "19.059.0029")]
    pub code: String,
    #[schema(example = "Disjuntor tripolar 40A")]
    pub name: String,
    pub category: KlasmatCategory,
    pub approved: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewKlasmatItem {
    pub code: String,
    pub name: String,
    pub category: KlasmatCategory,
    pub created_by: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateKlasmatPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Disjuntor tripolar 40A")]
    pub name: String,

    #[validate(length(min = 1, max = 32, message = "O código deve ter entre 1 e 32 caracteres."))]
    #[schema(example = "19.059.0029")]
    pub code: String,

    pub category: KlasmatCategory,
}

impl CreateKlasmatPayload {
    pub fn into_new(self, created_by: Uuid) -> NewKlasmatItem {
        NewKlasmatItem {
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            category: self.category,
            created_by,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KlasmatFilter {
    pub category: Option<KlasmatCategory>,
    /// Busca em nome e código
    pub q: Option<String>,
}

impl KlasmatFilter {
    pub fn matches(&self, item: &KlasmatItem) -> bool {
        let matches_category = self.category.is_none_or(|c| c == item.category);
        let matches_search = match self.q.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                item.name.to_lowercase().contains(&term) || item.code.to_lowercase().contains(&term)
            }
        };
        matches_category && matches_search
    }
}
