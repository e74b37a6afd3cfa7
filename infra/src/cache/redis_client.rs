//! Redis client with connection retry

use redis::{aio::MultiplexedConnection, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::{mask_url, InfrastructureError};

/// Shared multiplexed Redis connection plus the key namespace for this service
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    key_prefix: String,
}

impl RedisClient {
    /// Connect with up to three attempts and exponential backoff
    pub async fn new(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(config, 3, 100).await
    }

    pub async fn new_with_retry_config(
        config: &CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let timeout = Duration::from_secs(config.connection_timeout.max(1));
        let connection = Self::connect_with_retry(&client, timeout, max_retries, retry_delay_ms).await?;

        Ok(Self {
            connection,
            key_prefix: config.key_prefix.clone(),
        })
    }

    async fn connect_with_retry(
        client: &Client,
        timeout: Duration,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Connecting to Redis");

            let result = tokio::time::timeout(timeout, client.get_multiplexed_async_connection()).await;
            let error = match result {
                Ok(Ok(connection)) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Config(format!(
                    "Redis connection timed out after {}s",
                    timeout.as_secs()
                )),
            };

            if attempts >= max_retries {
                error!(attempts = attempts, error = %error, "Failed to connect to Redis");
                return Err(error);
            }

            warn!(
                attempt = attempts,
                max_retries = max_retries,
                retry_in_ms = delay,
                error = %error,
                "Redis connection failed, retrying"
            );
            sleep(Duration::from_millis(delay)).await;
            // Exponential backoff with cap at 5 seconds
            delay = (delay * 2).min(5000);
        }
    }

    /// A handle on the shared connection; cheap to clone
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Namespaced key for `suffix`
    pub fn key(&self, suffix: &str) -> String {
        format!("{}:{}", self.key_prefix, suffix)
    }

    /// `PING` the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}
