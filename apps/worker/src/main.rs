//! Genoshare storage removal worker.

#![forbid(unsafe_code)]

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use genoshare_application::{StorageRemovalBatch, StorageRemovalService};
use genoshare_core::{AppError, AppResult};
use genoshare_infrastructure::{
    DnanexusPlatformClient, PlatformBackend, PlatformConfig, PlatformSettings,
    PostgresStorageRemovalQueue,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    admin_token: String,
    batch_size: usize,
    max_attempts: i32,
    poll_interval_ms: u64,
    platform: PlatformConfig,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let removal_service = build_removal_service(pool, &config)?;
    let poll_interval = Duration::from_millis(config.poll_interval_ms);

    info!(
        backend = config.platform.backend.as_str(),
        batch_size = config.batch_size,
        max_attempts = config.max_attempts,
        poll_interval_ms = config.poll_interval_ms,
        "genoshare-worker started"
    );

    loop {
        match removal_service.process_due(config.batch_size).await {
            Ok(batch) => {
                if batch.claimed > 0 {
                    info!(
                        claimed = batch.claimed,
                        completed = batch.completed,
                        failed = batch.failed,
                        "storage removal pass finished"
                    );
                }
                if should_idle(&batch, config.batch_size) {
                    tokio::time::sleep(poll_interval).await;
                }
            }
            Err(error) => {
                warn!(error = %error, "failed to process storage removals");
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}

/// A full batch means more rows may be due right away.
fn should_idle(batch: &StorageRemovalBatch, batch_size: usize) -> bool {
    batch.claimed < batch_size
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_removal_service(pool: PgPool, config: &WorkerConfig) -> AppResult<StorageRemovalService> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    Ok(StorageRemovalService::new(
        Arc::new(PostgresStorageRemovalQueue::new(pool).with_max_attempts(config.max_attempts)),
        Arc::new(DnanexusPlatformClient::new(
            http_client,
            config.platform.api_server_uri.clone(),
        )),
        config.admin_token.clone(),
    ))
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let admin_token = required_env("PLATFORM_ADMIN_TOKEN")?;
        let batch_size = parse_env_usize("STORAGE_REMOVAL_BATCH_SIZE", 20)?;
        let max_attempts = parse_env_i32("STORAGE_REMOVAL_MAX_ATTEMPTS", 12)?;
        let poll_interval_ms = parse_env_u64("WORKER_POLL_INTERVAL_MS", 5000)?;

        if admin_token.trim().is_empty() {
            return Err(AppError::Validation(
                "PLATFORM_ADMIN_TOKEN must not be blank".to_owned(),
            ));
        }

        if batch_size == 0 {
            return Err(AppError::Validation(
                "STORAGE_REMOVAL_BATCH_SIZE must be greater than zero".to_owned(),
            ));
        }

        if max_attempts <= 0 {
            return Err(AppError::Validation(
                "STORAGE_REMOVAL_MAX_ATTEMPTS must be greater than zero".to_owned(),
            ));
        }

        if poll_interval_ms == 0 {
            return Err(AppError::Validation(
                "WORKER_POLL_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        let platform = PlatformConfig::from_settings(&PlatformSettings {
            backend: PlatformBackend::from_str(
                &env::var("PLATFORM_BACKEND").unwrap_or_default(),
            )?,
            dev_host: env::var("DEV_HOST")
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            local_development: false,
        })?;

        Ok(Self {
            database_url,
            admin_token,
            batch_size,
            max_attempts,
            poll_interval_ms,
            platform,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_usize(name: &str, default: usize) -> AppResult<usize> {
    match env::var(name) {
        Ok(value) => value.parse::<usize>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_i32(name: &str, default: i32) -> AppResult<i32> {
    match env::var(name) {
        Ok(value) => value.parse::<i32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use genoshare_application::StorageRemovalBatch;

    use super::should_idle;

    #[test]
    fn partial_batches_idle_until_next_poll() {
        let batch = StorageRemovalBatch {
            claimed: 3,
            completed: 2,
            failed: 1,
        };

        assert!(should_idle(&batch, 20));
    }

    #[test]
    fn full_batches_poll_again_immediately() {
        let batch = StorageRemovalBatch {
            claimed: 20,
            completed: 20,
            failed: 0,
        };

        assert!(!should_idle(&batch, 20));
    }
}
