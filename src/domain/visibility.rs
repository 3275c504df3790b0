// src/domain/visibility.rs

//! Projeção de visibilidade por papel.
//!
//! O escopo é sempre derivado da sessão autenticada, nunca de parâmetros do
//! cliente, e é aplicado antes dos filtros de busca/status.

use uuid::Uuid;

use crate::domain::lifecycle::is_finance_stage;
use crate::domain::roles::Capability;
use crate::models::auth::Session;
use crate::models::klasmat::KlasmatItem;
use crate::models::requisition::{Requisition, RequisitionFilter};
use crate::models::ut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequisitionScope {
    /// admin e viewer
    All,
    /// financeiro: as próprias mais todas as que estão no fluxo financeiro
    OwnAndFinanceStages(Uuid),
    /// demais: apenas as próprias
    Own(Uuid),
}

impl RequisitionScope {
    pub fn for_session(session: &Session) -> Self {
        if session.can(Capability::ViewAllRequisitions) {
            RequisitionScope::All
        } else if session.can(Capability::ViewFinanceQueue) {
            RequisitionScope::OwnAndFinanceStages(session.user_id)
        } else {
            RequisitionScope::Own(session.user_id)
        }
    }

    pub fn includes(&self, requisition: &Requisition) -> bool {
        match *self {
            RequisitionScope::All => true,
            RequisitionScope::OwnAndFinanceStages(user_id) => {
                requisition.is_owned_by(user_id) || is_finance_stage(requisition.status)
            }
            RequisitionScope::Own(user_id) => requisition.is_owned_by(user_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlasmatScope {
    All,
    ApprovedOnly,
}

impl KlasmatScope {
    pub fn for_session(session: &Session) -> Self {
        if session.can(Capability::ViewUnapprovedKlasmat) {
            KlasmatScope::All
        } else {
            KlasmatScope::ApprovedOnly
        }
    }

    pub fn includes(&self, item: &KlasmatItem) -> bool {
        match self {
            KlasmatScope::All => true,
            KlasmatScope::ApprovedOnly => item.approved,
        }
    }
}

pub fn project_requisitions(session: &Session, requisitions: Vec<Requisition>) -> Vec<Requisition> {
    let scope = RequisitionScope::for_session(session);
    requisitions.into_iter().filter(|r| scope.includes(r)).collect()
}

pub fn project_klasmat(session: &Session, items: Vec<KlasmatItem>) -> Vec<KlasmatItem> {
    let scope = KlasmatScope::for_session(session);
    items.into_iter().filter(|i| scope.includes(i)).collect()
}

impl RequisitionFilter {
    /// Filtro de apresentação (status e busca textual), aplicado sobre o conjunto já projetado.
    pub fn matches(&self, requisition: &Requisition) -> bool {
        if self.status.is_some_and(|s| s != requisition.status) {
            return false;
        }
        let term = match self.q.as_deref().map(str::trim) {
            None | Some("") => return true,
            Some(term) => term.to_lowercase(),
        };
        requisition.rq.to_lowercase().contains(&term)
            || requisition.descricao.to_lowercase().contains(&term)
            || requisition.ut.to_lowercase().contains(&term)
            || ut::describe(&requisition.ut).to_lowercase().contains(&term)
            || requisition
                .oc
                .as_deref()
                .is_some_and(|oc| oc.to_lowercase().contains(&term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::models::klasmat::KlasmatCategory;
    use crate::models::requisition::RequisitionStatus;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn session(role: Role) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            name: "Teste".into(),
            email: "teste@empresa.com".into(),
            role,
        }
    }

    fn requisition(owner: Uuid, status: RequisitionStatus) -> Requisition {
        let now = Utc::now();
        Requisition {
            id: Uuid::new_v4(),
            rq: "RQ001".into(),
            valor_total: Decimal::ONE,
            ut: "020-johnson-projetos-sjc".into(),
            descricao: "Troca de lâmpadas".into(),
            local: "Almox".into(),
            fornecedor: "ACME".into(),
            status,
            nota_fiscal: None,
            oc: Some("OC789".into()),
            data_emissao: None,
            valor_nf: None,
            nota_fiscal_pdf_url: None,
            usuario_envio: None,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn klasmat(code: &str, approved: bool) -> KlasmatItem {
        KlasmatItem {
            code: code.into(),
            name: "Item".into(),
            category: KlasmatCategory::Civil,
            approved,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn elevated_roles_see_everything() {
        let all = vec![
            requisition(Uuid::new_v4(), RequisitionStatus::Pendente),
            requisition(Uuid::new_v4(), RequisitionStatus::Paga),
        ];
        for role in [Role::Admin, Role::Viewer] {
            assert_eq!(project_requisitions(&session(role), all.clone()).len(), 2);
        }
    }

    #[test]
    fn financeiro_sees_own_and_finance_stages() {
        let fin = session(Role::Financeiro);
        let others_pending = requisition(Uuid::new_v4(), RequisitionStatus::Pendente);
        let others_waiting = requisition(Uuid::new_v4(), RequisitionStatus::AguardandoLancamento);
        let own_pending = requisition(fin.user_id, RequisitionStatus::Pendente);

        let visible = project_requisitions(
            &fin,
            vec![others_pending.clone(), others_waiting.clone(), own_pending.clone()],
        );
        assert!(!visible.contains(&others_pending));
        assert!(visible.contains(&others_waiting));
        assert!(visible.contains(&own_pending));
    }

    #[test]
    fn catalog_projection_hides_unapproved_from_non_admins() {
        let items = vec![klasmat("1", true), klasmat("2", false)];
        assert_eq!(project_klasmat(&session(Role::Admin), items.clone()).len(), 2);
        for role in [Role::User, Role::Viewer, Role::Financeiro] {
            let visible = project_klasmat(&session(role), items.clone());
            assert_eq!(visible.len(), 1);
            assert!(visible[0].approved);
        }
    }

    #[test]
    fn search_matches_rq_description_oc_and_ut() {
        let req = requisition(Uuid::new_v4(), RequisitionStatus::Pendente);
        let search = |q: &str| RequisitionFilter {
            status: None,
            q: Some(q.into()),
        };
        assert!(search("rq0").matches(&req));
        assert!(search("LÂMPADAS").matches(&req));
        assert!(search("oc7").matches(&req));
        assert!(search("kenvue").matches(&req));
        assert!(!search("inexistente").matches(&req));

        let by_status = RequisitionFilter {
            status: Some(RequisitionStatus::Paga),
            q: None,
        };
        assert!(!by_status.matches(&req));
    }

    proptest! {
        #[test]
        fn plain_user_projection_is_exactly_own(owners in prop::collection::vec(0usize..3, 0..20)) {
            let users: Vec<Session> = (0..3).map(|_| session(Role::User)).collect();
            let all: Vec<Requisition> = owners
                .iter()
                .map(|&i| requisition(users[i].user_id, RequisitionStatus::Pendente))
                .collect();

            for user in &users {
                let visible = project_requisitions(user, all.clone());
                let expected: Vec<Requisition> =
                    all.iter().filter(|r| r.user_id == user.user_id).cloned().collect();
                prop_assert_eq!(visible, expected);
            }
        }
    }
}
