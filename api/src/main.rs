use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use pw_api::{create_app, AppState};
use pw_core::repositories::{
    ChallengeStore, FraudAlertRepository, InMemoryChallengeStore, InMemoryFraudAlertRepository,
    InMemoryTransactionRepository, TransactionRepository,
};
use pw_core::services::{DynVerificationEngine, FraudAlertService, VerificationEngineConfig};
use pw_infra::cache::{RedisChallengeStore, RedisClient};
use pw_infra::database::{DatabasePool, MySqlFraudAlertRepository, MySqlTransactionRepository};
use pw_infra::health::HealthCheck;
use pw_infra::notification::create_notification_sink;
use pw_infra::oracle::create_scoring_oracle;
use pw_shared::{AppConfig, LoggingConfig, StorageBackend};

struct Stores {
    transactions: Arc<dyn TransactionRepository>,
    alerts: Arc<dyn FraudAlertRepository>,
    challenges: Arc<dyn ChallengeStore>,
    health_checks: Vec<Arc<dyn HealthCheck>>,
    pool: Option<DatabasePool>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    tracing::info!(environment = %config.environment, "Starting PayWatch API server");

    let stores = build_stores(&config).await?;
    let engine_config = VerificationEngineConfig::from(&config.verification);

    let oracle = create_scoring_oracle(&config.oracle, engine_config.oracle_timeout)
        .context("Failed to initialise scoring oracle")?;
    let notifier = create_notification_sink(&config.notification, engine_config.notification_timeout)
        .context("Failed to initialise notification sink")?;

    let engine: Arc<DynVerificationEngine> = Arc::new(DynVerificationEngine::new(
        stores.transactions,
        Arc::clone(&stores.alerts),
        stores.challenges,
        oracle,
        notifier,
        engine_config,
    ));
    let alerts = Arc::new(FraudAlertService::new(stores.alerts));

    spawn_challenge_purge(Arc::clone(&engine), config.verification.purge_interval_seconds);

    let state = web::Data::new(AppState::new(engine, alerts).with_health_checks(stores.health_checks));
    let bind_address = config.server.bind_address();
    let auth = config.auth.clone();
    let environment = config.environment;

    tracing::info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(state.clone(), &auth, environment));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("HTTP server error");

    if let Some(pool) = stores.pool {
        pool.close().await;
    }
    tracing::info!("Server stopped");
    result
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Stores {
                transactions: Arc::new(InMemoryTransactionRepository::new()),
                alerts: Arc::new(InMemoryFraudAlertRepository::new()),
                challenges: Arc::new(InMemoryChallengeStore::new()),
                health_checks: Vec::new(),
                pool: None,
            })
        }
        StorageBackend::MysqlRedis => {
            let pool = DatabasePool::new(&config.database)
                .await
                .context("Failed to connect to MySQL")?;
            pool.run_migrations().await.context("Failed to run migrations")?;

            let redis = RedisClient::new(&config.cache)
                .await
                .context("Failed to connect to Redis")?;

            Ok(Stores {
                transactions: Arc::new(MySqlTransactionRepository::new(pool.get_pool().clone())),
                alerts: Arc::new(MySqlFraudAlertRepository::new(pool.get_pool().clone())),
                challenges: Arc::new(RedisChallengeStore::new(redis.clone())),
                health_checks: vec![
                    Arc::new(pool.clone()) as Arc<dyn HealthCheck>,
                    Arc::new(redis) as Arc<dyn HealthCheck>,
                ],
                pool: Some(pool),
            })
        }
    }
}

/// Periodically drop expired challenge records
fn spawn_challenge_purge(engine: Arc<DynVerificationEngine>, interval_seconds: u64) {
    if interval_seconds == 0 {
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(error) = engine.purge_expired_challenges().await {
                tracing::warn!(error = %error, "Challenge purge failed");
            }
        }
    });
}
