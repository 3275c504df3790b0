// src/db/klasmat_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    domain::visibility::KlasmatScope,
    models::klasmat::{KlasmatItem, NewKlasmatItem},
};

#[async_trait]
pub trait KlasmatRepository: Send + Sync {
    async fn list(&self, scope: KlasmatScope) -> Result<Vec<KlasmatItem>, AppError>;

    /// Sempre grava como não aprovado. Código repetido vira `KlasmatCodeAlreadyExists`.
    async fn create(&self, item: &NewKlasmatItem) -> Result<KlasmatItem, AppError>;

    async fn approve(&self, code: &str) -> Result<Option<KlasmatItem>, AppError>;
}

#[derive(Clone)]
pub struct PgKlasmatRepository {
    pool: PgPool,
}

impl PgKlasmatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KlasmatRepository for PgKlasmatRepository {
    async fn list(&self, scope: KlasmatScope) -> Result<Vec<KlasmatItem>, AppError> {
        let items = sqlx::query_as::<_, KlasmatItem>(
            "SELECT * FROM klasmat_items WHERE ($1 OR approved) ORDER BY code",
        )
        .bind(scope == KlasmatScope::All)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create(&self, item: &NewKlasmatItem) -> Result<KlasmatItem, AppError> {
        let created = sqlx::query_as::<_, KlasmatItem>(
            r#"
            INSERT INTO klasmat_items (code, name, category, approved, created_by)
            VALUES ($1, $2, $3, false, $4)
            RETURNING *
            "#,
        )
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.category)
        .bind(item.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::KlasmatCodeAlreadyExists;
                }
            }
            e.into()
        })?;
        Ok(created)
    }

    async fn approve(&self, code: &str) -> Result<Option<KlasmatItem>, AppError> {
        let item = sqlx::query_as::<_, KlasmatItem>(
            "UPDATE klasmat_items SET approved = true WHERE code = $1 RETURNING *",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }
}
