//src/main.rs

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::middleware::auth::{auth_guard, optional_auth};
use crate::services::media::MAX_UPLOAD_BYTES;

// Folga para os campos de texto do multipart
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

fn api_routes(app_state: &AppState) -> Router<AppState> {
    // Públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Exigem token
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route("/companies", get(handlers::companies::list_companies))
        .route(
            "/companies/employees",
            get(handlers::companies::list_employees).post(handlers::companies::create_employee),
        )
        .route("/companies/{id}", get(handlers::companies::get_company))
        .route(
            "/groups",
            get(handlers::groups::list_groups).post(handlers::groups::create_group),
        )
        .route("/groups/{id}", get(handlers::groups::get_group))
        .route(
            "/groups/{id}/members",
            get(handlers::groups::list_members).post(handlers::groups::add_member),
        )
        .route("/groups/{id}/members/{user_id}", delete(handlers::groups::remove_member))
        .route("/groups/{id}/messages", get(handlers::messages::group_messages))
        .route(
            "/integration-requests",
            get(handlers::groups::list_requests).post(handlers::groups::create_request),
        )
        .route("/integration-requests/{id}/answer", post(handlers::groups::answer_request))
        .route("/messages", get(handlers::messages::list_messages))
        .route("/messages/send", post(handlers::messages::send_message))
        .route("/messages/conversation", get(handlers::messages::conversation))
        .route("/messages/{id}", get(handlers::messages::get_message))
        .route("/messages/{id}/read", post(handlers::messages::mark_read))
        .route("/conversations", get(handlers::messages::list_conversations))
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/unread", get(handlers::notifications::unread_count))
        .route("/notifications/mark_all_read", post(handlers::notifications::mark_all_read))
        .route("/notifications/{id}/read", post(handlers::notifications::mark_read))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Leitura aceita anónimos; escrita exige o AuthenticatedUser no handler
    let news_routes = Router::new()
        .route(
            "/articles",
            get(handlers::articles::list_articles).post(handlers::articles::create_article),
        )
        .route("/articles/mine", get(handlers::articles::my_articles))
        .route("/articles/popular", get(handlers::articles::popular_articles))
        .route(
            "/articles/{id}",
            get(handlers::articles::get_article)
                .put(handlers::articles::update_article)
                .delete(handlers::articles::delete_article),
        )
        .route("/articles/{id}/toggle_like", post(handlers::articles::toggle_like))
        .route(
            "/articles/{id}/comments",
            get(handlers::articles::list_comments).post(handlers::articles::add_comment),
        )
        .route("/articles/{id}/comment", post(handlers::articles::add_comment))
        .route(
            "/articles/{id}/upload_media",
            post(handlers::articles::upload_media).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/articles/{id}/media/{media_id}", delete(handlers::articles::delete_media))
        .route(
            "/news/categories",
            get(handlers::news::list_categories).post(handlers::news::create_category),
        )
        .route(
            "/news/tags",
            get(handlers::news::list_tags).post(handlers::news::create_tag),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), optional_auth));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .merge(news_routes)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("🔥 Falha ao escutar o sinal de término: {}", e);
    }
    tracing::info!("🛑 Encerrando o servidor...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Aplica as migrações pendentes antes de aceitar pedidos
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let mut app = Router::new()
        .nest("/api", api_routes(&app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()));

    // Mídia gravada em disco, servida pelo próprio servidor
    let media_path = config.media_url.trim_end_matches('/');
    if media_path.len() > 1 && media_path.starts_with('/') {
        app = app.nest_service(media_path, ServeDir::new(app_state.storage.root()));
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao escutar em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
