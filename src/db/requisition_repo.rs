// src/db/requisition_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    domain::visibility::RequisitionScope,
    models::requisition::{NewRequisition, Requisition, RequisitionPatch, RequisitionStatus},
};

#[async_trait]
pub trait RequisitionRepository: Send + Sync {
    /// Requisições dentro do escopo, opcionalmente de um único status, mais recentes primeiro.
    async fn list(
        &self,
        scope: RequisitionScope,
        status: Option<RequisitionStatus>,
    ) -> Result<Vec<Requisition>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Requisition>, AppError>;

    async fn create(&self, requisition: &NewRequisition) -> Result<Requisition, AppError>;

    /// Grava o patch numa única instrução. `None` se a requisição não existe.
    async fn update(&self, id: Uuid, patch: &RequisitionPatch) -> Result<Option<Requisition>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn count_by_status(&self) -> Result<Vec<(RequisitionStatus, i64)>, AppError>;
}

#[derive(Clone)]
pub struct PgRequisitionRepository {
    pool: PgPool,
}

impl PgRequisitionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// (dono, inclui fluxo financeiro)
fn scope_binds(scope: RequisitionScope) -> (Option<Uuid>, bool) {
    match scope {
        RequisitionScope::All => (None, false),
        RequisitionScope::OwnAndFinanceStages(user_id) => (Some(user_id), true),
        RequisitionScope::Own(user_id) => (Some(user_id), false),
    }
}

#[async_trait]
impl RequisitionRepository for PgRequisitionRepository {
    async fn list(
        &self,
        scope: RequisitionScope,
        status: Option<RequisitionStatus>,
    ) -> Result<Vec<Requisition>, AppError> {
        let (owner, include_finance) = scope_binds(scope);
        let rows = sqlx::query_as::<_, Requisition>(
            r#"
            SELECT * FROM requisitions
            WHERE ($1::uuid IS NULL OR user_id = $1 OR ($2 AND status <> 'pendente'))
              AND ($3::requisition_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .bind(include_finance)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Requisition>, AppError> {
        let row = sqlx::query_as::<_, Requisition>("SELECT * FROM requisitions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, requisition: &NewRequisition) -> Result<Requisition, AppError> {
        let row = sqlx::query_as::<_, Requisition>(
            r#"
            INSERT INTO requisitions (rq, valor_total, ut, descricao, "local", fornecedor, status, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, 'pendente', $7)
            RETURNING *
            "#,
        )
        .bind(&requisition.rq)
        .bind(requisition.valor_total)
        .bind(&requisition.ut)
        .bind(&requisition.descricao)
        .bind(&requisition.local)
        .bind(&requisition.fornecedor)
        .bind(requisition.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: &RequisitionPatch) -> Result<Option<Requisition>, AppError> {
        let row = sqlx::query_as::<_, Requisition>(
            r#"
            UPDATE requisitions SET
                rq                  = COALESCE($2, rq),
                valor_total         = COALESCE($3, valor_total),
                ut                  = COALESCE($4, ut),
                descricao           = COALESCE($5, descricao),
                "local"             = COALESCE($6, "local"),
                fornecedor          = COALESCE($7, fornecedor),
                status              = COALESCE($8, status),
                nota_fiscal         = COALESCE($9, nota_fiscal),
                oc                  = COALESCE($10, oc),
                data_emissao        = COALESCE($11, data_emissao),
                valor_nf            = COALESCE($12, valor_nf),
                nota_fiscal_pdf_url = COALESCE($13, nota_fiscal_pdf_url),
                usuario_envio       = COALESCE($14, usuario_envio),
                updated_at          = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.rq)
        .bind(patch.valor_total)
        .bind(&patch.ut)
        .bind(&patch.descricao)
        .bind(&patch.local)
        .bind(&patch.fornecedor)
        .bind(patch.status)
        .bind(&patch.nota_fiscal)
        .bind(&patch.oc)
        .bind(patch.data_emissao)
        .bind(patch.valor_nf)
        .bind(&patch.nota_fiscal_pdf_url)
        .bind(&patch.usuario_envio)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM requisitions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> Result<Vec<(RequisitionStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (RequisitionStatus, i64)>(
            "SELECT status, COUNT(*) FROM requisitions GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
