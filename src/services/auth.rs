// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    domain::{roles::Capability, validation::FieldError},
    models::auth::{
        Claims, NewUser, RegisterUserPayload, ReviewDecision, Role, Session, User, UserStatus,
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        token_ttl: chrono::Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self { user_repo, jwt_secret, token_ttl, bcrypt_cost }
    }

    /// Cadastro público: todo usuário nasce `user` e `pending`.
    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<User, AppError> {
        let password_hash = self.hash_password(payload.password).await?;

        let user = self
            .user_repo
            .create(&NewUser {
                email: normalize_email(&payload.email),
                name: payload.name.trim().to_string(),
                password_hash,
                role: Role::User,
                status: UserStatus::Pending,
                ut: payload.ut,
            })
            .await?;

        tracing::info!("📝 Novo cadastro aguardando aprovação: {}", user.email);
        Ok(user)
    }

    /// Só usuários aprovados recebem token. Qualquer outra situação é `InvalidCredentials`.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if user.status != UserStatus::Approved {
            tracing::info!("🔒 Login recusado para {} (status {:?})", user.email, user.status);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("🔑 Login de {} ({})", user.email, user.role);
        self.create_token(user.id)
    }

    /// Decodifica o token e recarrega o usuário: papel e aprovação valem como estão agora.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if user.status != UserStatus::Approved {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    pub async fn list_users(
        &self,
        session: &Session,
        status: Option<UserStatus>,
    ) -> Result<Vec<User>, AppError> {
        if !session.can(Capability::ManageUsers) {
            return Err(AppError::forbidden("Seu perfil não permite gerenciar usuários."));
        }
        self.user_repo.list(status).await
    }

    /// Aprovação ou rejeição, uma única vez por usuário. O papel só muda na aprovação.
    pub async fn set_user_status(
        &self,
        session: &Session,
        user_id: Uuid,
        decision: ReviewDecision,
        role: Option<Role>,
    ) -> Result<User, AppError> {
        if !session.can(Capability::ManageUsers) {
            return Err(AppError::forbidden("Seu perfil não permite gerenciar usuários."));
        }
        if role.is_some() && decision == ReviewDecision::Rejected {
            return Err(AppError::FieldErrors(vec![FieldError::new(
                "role",
                "O papel só pode ser definido na aprovação",
            )]));
        }

        let target = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        if target.status != UserStatus::Pending {
            return Err(AppError::UserAlreadyReviewed);
        }

        let status = UserStatus::from(decision);
        let updated = self
            .user_repo
            .set_status(user_id, status, role)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        tracing::info!(
            "👤 {} marcou {} como {:?} ({})",
            session.email,
            updated.email,
            status,
            updated.role
        );
        Ok(updated)
    }

    /// Garante um admin aprovado na inicialização. Não altera um usuário já existente.
    pub async fn bootstrap_admin(&self, email: &str, password: &str, name: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Ok(());
        }

        let password_hash = self.hash_password(password.to_string()).await?;
        self.user_repo
            .create(&NewUser {
                email: email.clone(),
                name: name.to_string(),
                password_hash,
                role: Role::Admin,
                status: UserStatus::Approved,
                ut: None,
            })
            .await?;

        tracing::info!("✅ Admin inicial criado: {}", email);
        Ok(())
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
