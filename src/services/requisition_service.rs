// src/services/requisition_service.rs

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RequisitionRepository,
    domain::{
        lifecycle::{self, is_finance_stage},
        roles::Capability,
        validation::{validate_for_finance_submission, FieldError},
        visibility::{project_requisitions, RequisitionScope},
    },
    models::auth::Session,
    models::requisition::{
        AttachmentPayload, CreateRequisitionPayload, FinanceCorrectionPayload, FinanceSubmissionPayload,
        FinanceSummary, Requisition, RequisitionDetail, RequisitionFilter, RequisitionPatch,
        RequisitionStatus, UpdateRequisitionPayload,
    },
    services::notification::{InvoiceConfirmation, Notifier},
    services::storage::{attachment_path, ObjectStorage},
};

struct DecodedAttachment {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct RequisitionService {
    repo: Arc<dyn RequisitionRepository>,
    storage: Option<Arc<dyn ObjectStorage>>,
    notifier: Arc<dyn Notifier>,
}

impl RequisitionService {
    pub fn new(
        repo: Arc<dyn RequisitionRepository>,
        storage: Option<Arc<dyn ObjectStorage>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { repo, storage, notifier }
    }

    pub async fn create(
        &self,
        session: &Session,
        payload: CreateRequisitionPayload,
    ) -> Result<Requisition, AppError> {
        if !session.can(Capability::CreateRequisition) {
            return Err(AppError::forbidden("Seu perfil não permite criar requisições."));
        }

        let requisition = self.repo.create(&payload.into_new(session.user_id)).await?;
        tracing::info!("🧾 Requisição {} criada por {}", requisition.rq, session.email);
        Ok(requisition)
    }

    /// Lista já projetada pela sessão; status e busca só restringem o que já é visível.
    pub async fn list(
        &self,
        session: &Session,
        filter: &RequisitionFilter,
    ) -> Result<Vec<Requisition>, AppError> {
        let scope = RequisitionScope::for_session(session);
        // O SQL já recorta pelo escopo; a projeção é a regra que vale.
        let rows = project_requisitions(session, self.repo.list(scope, filter.status).await?);
        Ok(rows.into_iter().filter(|r| filter.matches(r)).collect())
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> Result<RequisitionDetail, AppError> {
        let requisition = self.fetch_visible(session, id).await?;
        let allowed_transitions = lifecycle::allowed_transitions(session, &requisition);
        Ok(RequisitionDetail { requisition, allowed_transitions })
    }

    /// Edição dos dados principais, só enquanto `pendente`.
    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateRequisitionPayload,
    ) -> Result<Requisition, AppError> {
        let current = self.fetch_visible(session, id).await?;
        lifecycle::check_edit(session, &current)?;

        let patch = RequisitionPatch::from(payload);
        if !patch.touches_core_fields() && patch.fornecedor.is_none() {
            return Ok(current);
        }
        self.persist(id, &patch).await
    }

    /// pendente → aguardando_lancamento, gravando os dados da nota junto com o status.
    pub async fn submit_to_finance(
        &self,
        session: &Session,
        id: Uuid,
        payload: FinanceSubmissionPayload,
    ) -> Result<Requisition, AppError> {
        let current = self.fetch_visible(session, id).await?;
        lifecycle::check_submit(session, &current)?;

        let (submission, attachment) = payload.into_parts(&current);

        let mut errors = validate_for_finance_submission(&submission);
        let attachment = match attachment.map(decode_attachment).transpose() {
            Ok(attachment) => attachment,
            Err(e) => {
                errors.push(e);
                None
            }
        };
        if !errors.is_empty() {
            return Err(AppError::FieldErrors(errors));
        }
        let fields = submission.into_fields().map_err(AppError::FieldErrors)?;

        let pdf_url = match attachment {
            Some(attachment) => self.upload_attachment(id, attachment).await,
            None => None,
        };

        let patch = RequisitionPatch {
            status: Some(RequisitionStatus::AguardandoLancamento),
            usuario_envio: Some(session.name.clone()),
            nota_fiscal_pdf_url: pdf_url,
            ..Default::default()
        }
        .with_finance_fields(fields);

        let updated = self.persist(id, &patch).await?;
        tracing::info!("📤 Requisição {} enviada ao financeiro por {}", updated.rq, session.email);

        self.notify_submission(&session.email, &updated);
        Ok(updated)
    }

    /// Transições internas do financeiro.
    pub async fn change_status(
        &self,
        session: &Session,
        id: Uuid,
        to: RequisitionStatus,
    ) -> Result<Requisition, AppError> {
        let current = self.fetch_visible(session, id).await?;
        lifecycle::check_advance(session, &current, to)?;

        let patch = RequisitionPatch {
            status: Some(to),
            ..Default::default()
        };
        let updated = self.persist(id, &patch).await?;
        tracing::info!(
            "🔁 Requisição {}: {} -> {} por {}",
            updated.rq,
            current.status,
            to,
            session.email
        );
        Ok(updated)
    }

    /// Correção dos dados da nota antes do lançamento; a validação completa roda sobre o resultado.
    pub async fn correct_finance(
        &self,
        session: &Session,
        id: Uuid,
        payload: FinanceCorrectionPayload,
    ) -> Result<Requisition, AppError> {
        let current = self.fetch_visible(session, id).await?;
        lifecycle::check_finance_edit(session, &current)?;

        let merged = payload.merge_into(current.finance_submission());
        let fields = merged.into_fields().map_err(AppError::FieldErrors)?;

        let patch = RequisitionPatch::default().with_finance_fields(fields);
        let updated = self.persist(id, &patch).await?;
        tracing::info!("✏️  Dados financeiros da requisição {} corrigidos por {}", updated.rq, session.email);
        Ok(updated)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), AppError> {
        lifecycle::check_delete(session)?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Requisição"));
        }
        tracing::info!("🗑️  Requisição {} excluída por {}", id, session.email);
        Ok(())
    }

    /// Fila do financeiro: tudo além de `pendente`, dentro da visibilidade da sessão.
    pub async fn finance_queue(
        &self,
        session: &Session,
        filter: &RequisitionFilter,
    ) -> Result<Vec<Requisition>, AppError> {
        if !session.can(Capability::ViewFinanceQueue) {
            return Err(AppError::forbidden("Seu perfil não permite ver a fila do financeiro."));
        }
        let rows = self.list(session, filter).await?;
        Ok(rows.into_iter().filter(|r| is_finance_stage(r.status)).collect())
    }

    pub async fn finance_summary(&self, session: &Session) -> Result<FinanceSummary, AppError> {
        if !session.can(Capability::ViewFinanceQueue) {
            return Err(AppError::forbidden("Seu perfil não permite ver a fila do financeiro."));
        }

        let mut summary = FinanceSummary::default();
        for (status, count) in self.repo.count_by_status().await? {
            let count = count.max(0) as u64;
            let slot = match status {
                RequisitionStatus::Pendente => continue,
                RequisitionStatus::AguardandoLancamento => &mut summary.aguardando_lancamento,
                RequisitionStatus::AbriuChamado => &mut summary.abriu_chamado,
                RequisitionStatus::Lancada => &mut summary.lancada,
                RequisitionStatus::Paga => &mut summary.paga,
                RequisitionStatus::Cancelada => &mut summary.cancelada,
            };
            *slot += count;
            summary.total += count;
        }
        Ok(summary)
    }

    // Fora da visibilidade da sessão é o mesmo que não existir.
    async fn fetch_visible(&self, session: &Session, id: Uuid) -> Result<Requisition, AppError> {
        let scope = RequisitionScope::for_session(session);
        self.repo
            .find_by_id(id)
            .await?
            .filter(|r| scope.includes(r))
            .ok_or(AppError::NotFound("Requisição"))
    }

    async fn persist(&self, id: Uuid, patch: &RequisitionPatch) -> Result<Requisition, AppError> {
        self.repo
            .update(id, patch)
            .await?
            .ok_or(AppError::NotFound("Requisição"))
    }

    async fn upload_attachment(&self, id: Uuid, attachment: DecodedAttachment) -> Option<String> {
        let Some(storage) = &self.storage else {
            tracing::warn!("⚠️ Anexo da requisição {} ignorado: storage não configurado", id);
            return None;
        };

        let path = attachment_path(id, &attachment.file_name);
        match storage.upload(&path, &attachment.content_type, attachment.bytes).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("⚠️ Falha ao enviar anexo da requisição {}: {}", id, e);
                None
            }
        }
    }

    fn notify_submission(&self, recipient: &str, requisition: &Requisition) {
        let Some(confirmation) = InvoiceConfirmation::from_requisition(recipient, requisition) else {
            return;
        };
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.send_confirmation(&confirmation).await {
                tracing::warn!(
                    "⚠️ Falha ao enviar confirmação da NF {} para {}: {}",
                    confirmation.nota_fiscal,
                    confirmation.recipient,
                    e
                );
            }
        });
    }
}

fn decode_attachment(attachment: AttachmentPayload) -> Result<DecodedAttachment, FieldError> {
    let bytes = STANDARD
        .decode(attachment.data_base64.trim())
        .map_err(|_| FieldError::new("notaFiscalPdf", "O anexo deve estar em base64 válido"))?;
    if bytes.is_empty() {
        return Err(FieldError::new("notaFiscalPdf", "O anexo está vazio"));
    }
    Ok(DecodedAttachment {
        file_name: attachment.file_name,
        content_type: attachment.content_type,
        bytes,
    })
}
