// src/services/klasmat_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::KlasmatRepository,
    domain::{roles::Capability, visibility::{project_klasmat, KlasmatScope}},
    models::auth::Session,
    models::klasmat::{CreateKlasmatPayload, KlasmatFilter, KlasmatItem},
};

#[derive(Clone)]
pub struct KlasmatService {
    repo: Arc<dyn KlasmatRepository>,
}

impl KlasmatService {
    pub fn new(repo: Arc<dyn KlasmatRepository>) -> Self {
        Self { repo }
    }

    /// Admin vê o catálogo inteiro; os demais, apenas itens aprovados.
    pub async fn list(&self, session: &Session, filter: &KlasmatFilter) -> Result<Vec<KlasmatItem>, AppError> {
        let items = self.repo.list(KlasmatScope::for_session(session)).await?;
        Ok(project_klasmat(session, items)
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect())
    }

    pub async fn create(&self, session: &Session, payload: CreateKlasmatPayload) -> Result<KlasmatItem, AppError> {
        if !session.can(Capability::CreateKlasmatItem) {
            return Err(AppError::forbidden("Seu perfil não permite cadastrar itens Klasmat."));
        }
        payload.validate()?;

        let item = self.repo.create(&payload.into_new(session.user_id)).await?;
        tracing::info!("📦 Item Klasmat {} cadastrado por {} (aguardando aprovação)", item.code, session.email);
        Ok(item)
    }

    /// Aprovar um item já aprovado não é erro.
    pub async fn approve(&self, session: &Session, code: &str) -> Result<KlasmatItem, AppError> {
        if !session.can(Capability::ApproveKlasmatItem) {
            return Err(AppError::forbidden("Seu perfil não permite aprovar itens Klasmat."));
        }

        let item = self
            .repo
            .approve(code)
            .await?
            .ok_or(AppError::NotFound("Item Klasmat"))?;
        tracing::info!("✅ Item Klasmat {} aprovado por {}", item.code, session.email);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::db::memory::MemoryKlasmatRepository;
    use crate::models::auth::Role;
    use crate::models::klasmat::KlasmatCategory;

    fn session(role: Role) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            name: "Teste".into(),
            email: "teste@empresa.com".into(),
            role,
        }
    }

    fn payload(code: &str) -> CreateKlasmatPayload {
        CreateKlasmatPayload {
            name: "Disjuntor tripolar 40A".into(),
            code: code.into(),
            category: KlasmatCategory::Eletrica,
        }
    }

    fn service() -> KlasmatService {
        KlasmatService::new(Arc::new(MemoryKlasmatRepository::default()))
    }

    #[tokio::test]
    async fn approved_item_becomes_visible_to_users() {
        let service = service();
        let user = session(Role::User);
        let admin = session(Role::Admin);

        let created = service.create(&user, payload("19.059.0029")).await.unwrap();
        assert!(!created.approved);
        assert!(service.list(&user, &KlasmatFilter::default()).await.unwrap().is_empty());
        assert_eq!(service.list(&admin, &KlasmatFilter::default()).await.unwrap().len(), 1);

        let approved = service.approve(&admin, "19.059.0029").await.unwrap();
        assert!(approved.approved);

        let visible = service.list(&user, &KlasmatFilter::default()).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].code, "19.059.0029");
    }

    #[tokio::test]
    async fn admin_created_item_still_needs_approval() {
        let service = service();
        let admin = session(Role::Admin);

        let created = service.create(&admin, payload("20.001.0001")).await.unwrap();
        assert!(!created.approved);
        assert!(service.list(&session(Role::User), &KlasmatFilter::default()).await.unwrap().is_empty());

        service.approve(&admin, "20.001.0001").await.unwrap();
        assert_eq!(service.list(&session(Role::User), &KlasmatFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approving_twice_is_harmless() {
        let service = service();
        let admin = session(Role::Admin);
        service.create(&session(Role::User), payload("1")).await.unwrap();

        service.approve(&admin, "1").await.unwrap();
        let again = service.approve(&admin, "1").await.unwrap();
        assert!(again.approved);
    }

    #[tokio::test]
    async fn approval_rules() {
        let service = service();
        service.create(&session(Role::User), payload("1")).await.unwrap();

        assert!(matches!(
            service.approve(&session(Role::User), "1").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.approve(&session(Role::Admin), "nao-existe").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn viewer_cannot_create_and_duplicates_conflict() {
        let service = service();
        assert!(matches!(
            service.create(&session(Role::Viewer), payload("1")).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(service.list(&session(Role::Admin), &KlasmatFilter::default()).await.unwrap().is_empty());

        service.create(&session(Role::User), payload("1")).await.unwrap();
        assert!(matches!(
            service.create(&session(Role::User), payload("1")).await,
            Err(AppError::KlasmatCodeAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn filters_apply_after_projection() {
        let service = service();
        let admin = session(Role::Admin);
        service.create(&session(Role::User), payload("1")).await.unwrap();

        let filter = KlasmatFilter {
            category: Some(KlasmatCategory::Eletrica),
            q: Some("disjuntor".into()),
        };
        assert_eq!(service.list(&admin, &filter).await.unwrap().len(), 1);
        assert!(service.list(&session(Role::Financeiro), &filter).await.unwrap().is_empty());

        let other = KlasmatFilter {
            category: Some(KlasmatCategory::Civil),
            q: None,
        };
        assert!(service.list(&admin, &other).await.unwrap().is_empty());
    }
}
