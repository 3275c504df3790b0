// src/db/memory.rs

//! Repositórios em memória para os testes de serviço e de handler.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{KlasmatRepository, RequisitionRepository, UserRepository},
    domain::visibility::{KlasmatScope, RequisitionScope},
    models::auth::{NewUser, Role, User, UserStatus},
    models::klasmat::{KlasmatItem, NewKlasmatItem},
    models::requisition::{NewRequisition, Requisition, RequisitionPatch, RequisitionStatus},
};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::EmailAlreadyExists);
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            status: user.status,
            ut: user.ut.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: UserStatus,
        role: Option<Role>,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.status = status;
            if let Some(role) = role {
                u.role = role;
            }
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .rev()
            .filter(|u| u.role != Role::Admin)
            .filter(|u| status.is_none_or(|s| s == u.status))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryRequisitionRepository {
    rows: Mutex<Vec<Requisition>>,
    fail_writes: AtomicBool,
}

impl MemoryRequisitionRepository {
    /// Faz as próximas escritas falharem, simulando o banco fora do ar.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn snapshot(&self, id: Uuid) -> Option<Requisition> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl RequisitionRepository for MemoryRequisitionRepository {
    async fn list(
        &self,
        scope: RequisitionScope,
        status: Option<RequisitionStatus>,
    ) -> Result<Vec<Requisition>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|r| scope.includes(r))
            .filter(|r| status.is_none_or(|s| s == r.status))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Requisition>, AppError> {
        Ok(self.snapshot(id))
    }

    async fn create(&self, requisition: &NewRequisition) -> Result<Requisition, AppError> {
        self.check_writable()?;
        let now = Utc::now();
        let created = Requisition {
            id: Uuid::new_v4(),
            rq: requisition.rq.clone(),
            valor_total: requisition.valor_total,
            ut: requisition.ut.clone(),
            descricao: requisition.descricao.clone(),
            local: requisition.local.clone(),
            fornecedor: requisition.fornecedor.clone(),
            status: RequisitionStatus::Pendente,
            nota_fiscal: None,
            oc: None,
            data_emissao: None,
            valor_nf: None,
            nota_fiscal_pdf_url: None,
            usuario_envio: None,
            user_id: requisition.user_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: &RequisitionPatch) -> Result<Option<Requisition>, AppError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
            patch.apply_to(r);
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }

    async fn count_by_status(&self) -> Result<Vec<(RequisitionStatus, i64)>, AppError> {
        let rows = self.rows.lock().unwrap();
        let mut counts: Vec<(RequisitionStatus, i64)> = Vec::new();
        for r in rows.iter() {
            match counts.iter_mut().find(|(s, _)| *s == r.status) {
                Some((_, n)) => *n += 1,
                None => counts.push((r.status, 1)),
            }
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct MemoryKlasmatRepository {
    items: Mutex<Vec<KlasmatItem>>,
}

#[async_trait]
impl KlasmatRepository for MemoryKlasmatRepository {
    async fn list(&self, scope: KlasmatScope) -> Result<Vec<KlasmatItem>, AppError> {
        let items = self.items.lock().unwrap();
        let mut visible: Vec<KlasmatItem> = items.iter().filter(|i| scope.includes(i)).cloned().collect();
        visible.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(visible)
    }

    async fn create(&self, item: &NewKlasmatItem) -> Result<KlasmatItem, AppError> {
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|i| i.code == item.code) {
            return Err(AppError::KlasmatCodeAlreadyExists);
        }
        let created = KlasmatItem {
            code: item.code.clone(),
            name: item.name.clone(),
            category: item.category,
            approved: false,
            created_by: Some(item.created_by),
            created_at: Utc::now(),
        };
        items.push(created.clone());
        Ok(created)
    }

    async fn approve(&self, code: &str) -> Result<Option<KlasmatItem>, AppError> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|i| i.code == code).map(|i| {
            i.approved = true;
            i.clone()
        }))
    }
}
