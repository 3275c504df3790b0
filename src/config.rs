// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        KlasmatRepository, PgKlasmatRepository, PgRequisitionRepository, PgUserRepository,
        RequisitionRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        klasmat_service::KlasmatService,
        notification::{HttpNotifier, LogNotifier, Notifier},
        requisition_service::RequisitionService,
        storage::{HttpObjectStorage, ObjectStorage},
    },
};

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Configuração lida do ambiente (com `.env` carregado pelo `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub jwt_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub storage: Option<StorageConfig>,
    pub notification: Option<NotificationConfig>,
    pub admin: Option<AdminConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = match (optional("STORAGE_URL"), optional("STORAGE_BUCKET"), optional("STORAGE_KEY")) {
            (Some(url), Some(bucket), Some(key)) => Some(StorageConfig { url, bucket, key }),
            (None, None, None) => None,
            _ => anyhow::bail!("STORAGE_URL, STORAGE_BUCKET e STORAGE_KEY devem ser definidas juntas"),
        };

        let notification = match (optional("NOTIFICATION_URL"), optional("NOTIFICATION_KEY")) {
            (Some(url), Some(key)) => Some(NotificationConfig { url, key }),
            (None, None) => None,
            _ => anyhow::bail!("NOTIFICATION_URL e NOTIFICATION_KEY devem ser definidas juntas"),
        };

        let admin = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminConfig {
                email,
                password,
                name: optional("ADMIN_NAME").unwrap_or_else(|| "Administrador".to_string()),
            }),
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_EMAIL e ADMIN_PASSWORD devem ser definidas juntas"),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            max_connections: parsed("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_ttl_days: parsed("JWT_TTL_DAYS", 7)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            storage,
            notification,
            admin,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &str) -> anyhow::Result<String> {
    optional(name).with_context(|| format!("{} deve ser definida", name))
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: {}", name, raw)),
        None => Ok(default),
    }
}

pub async fn connect_pool(config: &Config) -> anyhow::Result<PgPool> {
    let db_pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(db_pool)
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub requisition_service: RequisitionService,
    pub klasmat_service: KlasmatService,
}

impl AppState {
    pub fn new(config: &Config, db_pool: PgPool) -> Self {
        Self::with_repositories(
            config,
            Arc::new(PgUserRepository::new(db_pool.clone())),
            Arc::new(PgRequisitionRepository::new(db_pool.clone())),
            Arc::new(PgKlasmatRepository::new(db_pool)),
        )
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_repositories(
        config: &Config,
        user_repo: Arc<dyn UserRepository>,
        requisition_repo: Arc<dyn RequisitionRepository>,
        klasmat_repo: Arc<dyn KlasmatRepository>,
    ) -> Self {
        let http = reqwest::Client::new();

        let storage: Option<Arc<dyn ObjectStorage>> = match &config.storage {
            Some(s) => Some(Arc::new(HttpObjectStorage::new(http.clone(), &s.url, &s.bucket, &s.key))),
            None => {
                tracing::warn!("⚠️ Storage não configurado: anexos de NF serão ignorados");
                None
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.notification {
            Some(n) => Arc::new(HttpNotifier::new(http, &n.url, &n.key)),
            None => Arc::new(LogNotifier),
        };

        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            chrono::Duration::days(config.jwt_ttl_days),
            config.bcrypt_cost,
        );

        Self {
            auth_service,
            requisition_service: RequisitionService::new(requisition_repo, storage, notifier),
            klasmat_service: KlasmatService::new(klasmat_repo),
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/requisicoes_test".into(),
            jwt_secret: "segredo-de-teste".into(),
            bind_addr: "127.0.0.1:0".into(),
            max_connections: 1,
            jwt_ttl_days: 1,
            bcrypt_cost: 4,
            storage: None,
            notification: None,
            admin: None,
        }
    }
}
