use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use kotoba_core::config::{AppConfig, ConfigError, LoadOptions};
use kotoba_core::{MessengerError, TranslationEngine, TranslatorError};
use kotoba_db::{connect_with_settings, migrations, DbPool, SqlPreferenceStore};
use kotoba_slack::SlackMessenger;
use kotoba_translate::DeepLTranslator;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub engine: Arc<TranslationEngine>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("slack client construction failed: {0}")]
    Messenger(#[from] MessengerError),
    #[error("translator construction failed: {0}")]
    Translator(#[from] TranslatorError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let store = SqlPreferenceStore::new(db_pool.clone());
    let messenger = SlackMessenger::new(config.slack.bot_token.clone())?;
    let translator =
        DeepLTranslator::new(config.deepl.api_key.clone(), config.deepl.base_url.clone())?;

    let engine = Arc::new(TranslationEngine::new(
        Arc::new(store),
        Arc::new(messenger),
        Arc::new(translator),
    ));

    Ok(Application { config, db_pool, engine })
}

#[cfg(test)]
mod tests {
    use kotoba_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    #[tokio::test]
    async fn bootstrap_fails_fast_on_a_malformed_bot_token() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                slack_bot_token: Some("invalid-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("bootstrap error").to_string();
        assert!(message.contains("slack.bot_token"));
    }

    #[tokio::test]
    async fn bootstrap_builds_the_engine_and_applies_migrations() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_string()),
                slack_bot_token: Some("xoxb-valid".to_string()),
                deepl_api_key: Some("deepl-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'preference'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("preference table should exist after bootstrap");
        assert_eq!(table_count, 1);
    }
}
