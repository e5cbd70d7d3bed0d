// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ArticleRepository, CompanyRepository, GroupRepository, MessageRepository,
        NotificationRepository, UserRepository,
    },
    services::{
        article_service::ArticleService,
        auth::AuthService,
        company_service::CompanyService,
        group_service::GroupService,
        media::ImageMediaProcessor,
        message_service::MessageService,
        notification_service::NotificationService,
        storage::LocalFileStorage,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MEDIA_ROOT: &str = "./media";
const DEFAULT_MEDIA_URL: &str = "/media";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_TTL_DAYS: i64 = 7;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub media_root: PathBuf,
    pub media_url: String,
    pub db_max_connections: u32,
    pub jwt_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado do `env` para poder ser testado sem mexer no processo
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let jwt_ttl_days = match lookup("JWT_TTL_DAYS") {
            Some(v) => v.parse().context("JWT_TTL_DAYS deve ser um número")?,
            None => DEFAULT_JWT_TTL_DAYS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR", DEFAULT_BIND_ADDR),
            media_root: PathBuf::from(optional("MEDIA_ROOT", DEFAULT_MEDIA_ROOT)),
            media_url: optional("MEDIA_URL", DEFAULT_MEDIA_URL),
            db_max_connections,
            jwt_ttl_days,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub storage: Arc<LocalFileStorage>,
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub group_service: GroupService,
    pub message_service: MessageService,
    pub article_service: ArticleService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = Arc::new(I18nStore::new()?);
        let storage = Arc::new(LocalFileStorage::new(config.media_root.clone(), &config.media_url)?);

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let group_repo = GroupRepository::new(db_pool.clone());
        let message_repo = MessageRepository::new(db_pool.clone());
        let article_repo = ArticleRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            company_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_days,
            db_pool.clone(),
        );
        let company_service = CompanyService::new(company_repo.clone());
        let group_service = GroupService::new(
            group_repo.clone(),
            company_repo.clone(),
            user_repo.clone(),
            db_pool.clone(),
        );
        let message_service = MessageService::new(
            message_repo,
            group_repo,
            company_repo.clone(),
            user_repo.clone(),
            db_pool.clone(),
        );
        let notification_service = NotificationService::new(
            notification_repo,
            user_repo,
            company_repo.clone(),
            db_pool.clone(),
        );
        let article_service = ArticleService::new(
            article_repo,
            company_repo,
            notification_service.clone(),
            storage.clone(),
            Arc::new(ImageMediaProcessor),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            i18n_store,
            storage,
            auth_service,
            company_service,
            group_service,
            message_service,
            article_service,
            notification_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/sj"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert_eq!(config.media_url, "/media");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_ttl_days, 7);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/sj")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn numbers_must_parse() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/sj"),
            ("JWT_SECRET", "segredo"),
            ("JWT_TTL_DAYS", "sete"),
        ]));
        assert!(result.is_err());
    }
}
