// src/domain/lifecycle.rs

//! Máquina de estados da requisição.
//!
//! pendente → aguardando_lancamento → {lancada, abriu_chamado, cancelada}
//! abriu_chamado → lancada
//! lancada → paga
//!
//! `paga` e `cancelada` são terminais. Nenhuma transição volta para `pendente`.
//! As funções `check_*` são os guardas: rodam antes de qualquer escrita e
//! devolvem o erro que a operação deve propagar.

use crate::common::error::AppError;
use crate::domain::roles::Capability;
use crate::models::auth::{Role, Session};
use crate::models::requisition::{Requisition, RequisitionStatus};

use RequisitionStatus::*;

pub fn next_statuses(from: RequisitionStatus) -> &'static [RequisitionStatus] {
    match from {
        Pendente => &[AguardandoLancamento],
        AguardandoLancamento => &[Lancada, AbriuChamado, Cancelada],
        AbriuChamado => &[Lancada],
        Lancada => &[Paga],
        Paga | Cancelada => &[],
    }
}

pub fn can_transition(from: RequisitionStatus, to: RequisitionStatus) -> bool {
    next_statuses(from).contains(&to)
}

/// Todo status além de `pendente` pertence ao fluxo financeiro.
pub fn is_finance_stage(status: RequisitionStatus) -> bool {
    status != Pendente
}

/// Dados financeiros só podem ser corrigidos enquanto ainda não houve lançamento.
pub fn finance_fields_editable(status: RequisitionStatus) -> bool {
    matches!(status, AguardandoLancamento | AbriuChamado)
}

/// Capacidades restritas ao dono valem sobre qualquer requisição para admin.
pub fn may_act_on(session: &Session, capability: Capability, requisition: &Requisition) -> bool {
    if !session.can(capability) {
        return false;
    }
    !capability.is_owner_scoped()
        || session.role == Role::Admin
        || requisition.is_owned_by(session.user_id)
}

fn denied(action: &str) -> AppError {
    AppError::forbidden(format!("Seu perfil não permite {}.", action))
}

/// Edição dos campos principais (rq, valorTotal, ut, descricao, local, fornecedor).
pub fn check_edit(session: &Session, requisition: &Requisition) -> Result<(), AppError> {
    if !may_act_on(session, Capability::EditRequisition, requisition) {
        return Err(denied("editar esta requisição"));
    }
    if requisition.status != Pendente {
        return Err(AppError::forbidden(
            "Somente requisições pendentes podem ser editadas.",
        ));
    }
    Ok(())
}

/// pendente → aguardando_lancamento. A validação dos dados vem depois deste guarda.
pub fn check_submit(session: &Session, requisition: &Requisition) -> Result<(), AppError> {
    if !may_act_on(session, Capability::SubmitToFinance, requisition) {
        return Err(denied("enviar esta requisição ao financeiro"));
    }
    if !can_transition(requisition.status, AguardandoLancamento) {
        return Err(AppError::InvalidTransition {
            from: requisition.status,
            to: AguardandoLancamento,
        });
    }
    Ok(())
}

/// Transições internas do financeiro (tudo que sai de `aguardando_lancamento` em diante).
pub fn check_advance(
    session: &Session,
    requisition: &Requisition,
    to: RequisitionStatus,
) -> Result<(), AppError> {
    if !session.can(Capability::AdvanceFinanceStatus) {
        return Err(denied("alterar o status financeiro"));
    }
    // A entrada no financeiro exige os dados da nota: só pelo envio.
    if to == AguardandoLancamento || !can_transition(requisition.status, to) {
        return Err(AppError::InvalidTransition {
            from: requisition.status,
            to,
        });
    }
    Ok(())
}

pub fn check_finance_edit(session: &Session, requisition: &Requisition) -> Result<(), AppError> {
    if !session.can(Capability::EditFinanceFields) {
        return Err(denied("corrigir dados financeiros"));
    }
    if !finance_fields_editable(requisition.status) {
        return Err(AppError::forbidden(
            "Os dados financeiros só podem ser corrigidos antes do lançamento.",
        ));
    }
    Ok(())
}

pub fn check_delete(session: &Session) -> Result<(), AppError> {
    if !session.can(Capability::DeleteRequisition) {
        return Err(denied("excluir requisições"));
    }
    Ok(())
}

/// Status para os quais a sessão pode levar a requisição agora.
pub fn allowed_transitions(session: &Session, requisition: &Requisition) -> Vec<RequisitionStatus> {
    next_statuses(requisition.status)
        .iter()
        .copied()
        .filter(|to| {
            if *to == AguardandoLancamento {
                check_submit(session, requisition).is_ok()
            } else {
                check_advance(session, requisition, *to).is_ok()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    const ALL: [RequisitionStatus; 6] =
        [Pendente, AguardandoLancamento, Lancada, Paga, Cancelada, AbriuChamado];

    fn is_terminal(status: RequisitionStatus) -> bool {
        next_statuses(status).is_empty()
    }

    // Posição no fluxo; toda transição legal aumenta este número.
    fn stage_rank(status: RequisitionStatus) -> u8 {
        match status {
            Pendente => 0,
            AguardandoLancamento => 1,
            AbriuChamado => 2,
            Lancada => 3,
            Paga | Cancelada => 4,
        }
    }

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
            valor_total: Decimal::new(10000, 2),
            ut: "020-johnson-projetos-sjc".into(),
            descricao: "test".into(),
            local: "Almox".into(),
            fornecedor: "ACME".into(),
            status,
            nota_fiscal: None,
            oc: None,
            data_emissao: None,
            valor_nf: None,
            nota_fiscal_pdf_url: None,
            usuario_envio: None,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn transition_table() {
        assert!(can_transition(Pendente, AguardandoLancamento));
        assert!(can_transition(AguardandoLancamento, Lancada));
        assert!(can_transition(AguardandoLancamento, AbriuChamado));
        assert!(can_transition(AguardandoLancamento, Cancelada));
        assert!(can_transition(AbriuChamado, Lancada));
        assert!(can_transition(Lancada, Paga));

        assert!(!can_transition(Pendente, Lancada));
        assert!(!can_transition(AbriuChamado, Cancelada));
        assert!(!can_transition(Lancada, AguardandoLancamento));
        assert!(is_terminal(Paga));
        assert!(is_terminal(Cancelada));
        assert!(!is_terminal(AbriuChamado));
    }

    #[test]
    fn nothing_leads_back_to_pendente() {
        for from in ALL {
            assert!(!can_transition(from, Pendente));
        }
    }

    #[test]
    fn owner_submits_but_stranger_does_not() {
        let owner = session(Role::User);
        let stranger = session(Role::User);
        let req = requisition(owner.user_id, Pendente);

        assert!(check_submit(&owner, &req).is_ok());
        assert!(matches!(check_submit(&stranger, &req), Err(AppError::Forbidden(_))));
        assert!(check_submit(&session(Role::Admin), &req).is_ok());
    }

    #[test]
    fn submit_twice_is_an_invalid_transition() {
        let owner = session(Role::User);
        let req = requisition(owner.user_id, AguardandoLancamento);
        assert!(matches!(
            check_submit(&owner, &req),
            Err(AppError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn only_finance_roles_advance() {
        let req = requisition(Uuid::new_v4(), AguardandoLancamento);
        assert!(check_advance(&session(Role::Financeiro), &req, Lancada).is_ok());
        assert!(check_advance(&session(Role::Admin), &req, Cancelada).is_ok());
        assert!(matches!(
            check_advance(&session(Role::Viewer), &req, Lancada),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_advance(&session(Role::User), &req, Lancada),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn advance_cannot_enter_finance_without_submission() {
        let req = requisition(Uuid::new_v4(), Pendente);
        assert!(matches!(
            check_advance(&session(Role::Admin), &req, AguardandoLancamento),
            Err(AppError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn edit_only_while_pendente() {
        let owner = session(Role::User);
        assert!(check_edit(&owner, &requisition(owner.user_id, Pendente)).is_ok());
        assert!(check_edit(&owner, &requisition(owner.user_id, AguardandoLancamento)).is_err());
        assert!(check_edit(&session(Role::Viewer), &requisition(owner.user_id, Pendente)).is_err());
    }

    #[test]
    fn finance_edit_window() {
        let fin = session(Role::Financeiro);
        let owner = Uuid::new_v4();
        assert!(check_finance_edit(&fin, &requisition(owner, AguardandoLancamento)).is_ok());
        assert!(check_finance_edit(&fin, &requisition(owner, AbriuChamado)).is_ok());
        assert!(check_finance_edit(&fin, &requisition(owner, Lancada)).is_err());
        assert!(check_finance_edit(&session(Role::User), &requisition(owner, AguardandoLancamento)).is_err());
    }

    #[test]
    fn allowed_transitions_depend_on_role_and_state() {
        let owner = session(Role::User);
        let pending = requisition(owner.user_id, Pendente);
        assert_eq!(allowed_transitions(&owner, &pending), vec![AguardandoLancamento]);
        assert!(allowed_transitions(&session(Role::Viewer), &pending).is_empty());

        let waiting = requisition(owner.user_id, AguardandoLancamento);
        assert!(allowed_transitions(&owner, &waiting).is_empty());
        assert_eq!(
            allowed_transitions(&session(Role::Financeiro), &waiting),
            vec![Lancada, AbriuChamado, Cancelada]
        );
        assert!(allowed_transitions(&session(Role::Admin), &requisition(owner.user_id, Paga)).is_empty());
    }

    fn any_status() -> impl Strategy<Value = RequisitionStatus> {
        prop::sample::select(ALL.to_vec())
    }

    proptest! {
        #[test]
        fn legal_transitions_always_move_forward(from in any_status(), to in any_status()) {
            if can_transition(from, to) {
                prop_assert!(stage_rank(to) > stage_rank(from));
            }
        }

        #[test]
        fn random_walks_never_regress(steps in prop::collection::vec(0usize..3, 0..10)) {
            let mut status = Pendente;
            for pick in steps {
                let options = next_statuses(status);
                if options.is_empty() {
                    break;
                }
                let next = options[pick % options.len()];
                prop_assert!(stage_rank(next) > stage_rank(status));
                prop_assert_ne!(next, Pendente);
                status = next;
            }
        }
    }
}
