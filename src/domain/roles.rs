// src/domain/roles.rs

//! Capacidades por papel. Esta é a única tabela de autorização do sistema:
//! os serviços consultam `Role::can` antes de qualquer escrita e o `/me`
//! expõe o mesmo resultado para a interface.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    CreateRequisition,
    /// Editar campos principais enquanto `pendente` (dono ou admin)
    EditRequisition,
    /// Enviar ao financeiro (dono ou admin)
    SubmitToFinance,
    AdvanceFinanceStatus,
    EditFinanceFields,
    DeleteRequisition,
    ViewAllRequisitions,
    ViewFinanceQueue,
    CreateKlasmatItem,
    ApproveKlasmatItem,
    ViewUnapprovedKlasmat,
    ManageUsers,
}

impl Capability {
    pub const ALL: [Capability; 12] = [
        Capability::CreateRequisition,
        Capability::EditRequisition,
        Capability::SubmitToFinance,
        Capability::AdvanceFinanceStatus,
        Capability::EditFinanceFields,
        Capability::DeleteRequisition,
        Capability::ViewAllRequisitions,
        Capability::ViewFinanceQueue,
        Capability::CreateKlasmatItem,
        Capability::ApproveKlasmatItem,
        Capability::ViewUnapprovedKlasmat,
        Capability::ManageUsers,
    ];

    /// Capacidades que só valem sobre requisições do próprio usuário
    /// (exceto para admin, que age sobre qualquer uma).
    pub fn is_owner_scoped(self) -> bool {
        matches!(self, Capability::EditRequisition | Capability::SubmitToFinance)
    }
}

impl Role {
    pub fn can(self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Admin => true,
            Role::Viewer => matches!(capability, ViewAllRequisitions | ViewFinanceQueue),
            Role::User => matches!(
                capability,
                CreateRequisition | EditRequisition | SubmitToFinance | CreateKlasmatItem
            ),
            Role::Financeiro => matches!(
                capability,
                CreateRequisition
                    | EditRequisition
                    | SubmitToFinance
                    | AdvanceFinanceStatus
                    | EditFinanceFields
                    | ViewFinanceQueue
                    | CreateKlasmatItem
            ),
        }
    }

    pub fn capabilities(self) -> Vec<Capability> {
        Capability::ALL.into_iter().filter(|c| self.can(*c)).collect()
    }
}
