//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod domain;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let db_pool = config::connect_pool(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app_state = AppState::new(&config, db_pool);

    if let Some(admin) = &config.admin {
        app_state
            .auth_service
            .bootstrap_admin(&admin.email, &admin.password, &admin.name)
            .await
            .context("Falha ao criar o admin inicial")?;
    }

    let app = app(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

fn app(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Tudo abaixo exige token válido de usuário aprovado
    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .route("/users", get(handlers::users::list_users))
        .route("/users/{id}/status", patch(handlers::users::update_user_status))
        .route(
            "/requisitions",
            get(handlers::requisitions::list_requisitions).post(handlers::requisitions::create_requisition),
        )
        .route(
            "/requisitions/{id}",
            get(handlers::requisitions::get_requisition)
                .patch(handlers::requisitions::update_requisition)
                .delete(handlers::requisitions::delete_requisition),
        )
        .route(
            "/requisitions/{id}/finance",
            post(handlers::requisitions::submit_to_finance).patch(handlers::requisitions::correct_finance),
        )
        .route("/requisitions/{id}/status", patch(handlers::requisitions::change_status))
        .route("/finance/requisitions", get(handlers::finance::finance_queue))
        .route("/finance/summary", get(handlers::finance::finance_summary))
        .route(
            "/klasmat",
            get(handlers::klasmat::list_items).post(handlers::klasmat::create_item),
        )
        .route("/klasmat/{code}/approve", post(handlers::klasmat::approve_item))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/uts", get(handlers::uts::list_uts))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .with_state(app_state)
}
