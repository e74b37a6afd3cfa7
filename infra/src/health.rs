//! Backend health checks reported by the `/health` endpoint

use async_trait::async_trait;

/// A backing service the API depends on
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Name reported in the health body
    fn name(&self) -> &'static str;

    /// Whether the service answered
    async fn is_healthy(&self) -> bool;
}

#[cfg(feature = "mysql")]
#[async_trait]
impl HealthCheck for crate::database::DatabasePool {
    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn is_healthy(&self) -> bool {
        match self.health_check().await {
            Ok(healthy) => healthy,
            Err(error) => {
                tracing::warn!(error = %error, event = "health_check_failed", "MySQL health check failed");
                false
            }
        }
    }
}

#[cfg(feature = "redis-cache")]
#[async_trait]
impl HealthCheck for crate::cache::RedisClient {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn is_healthy(&self) -> bool {
        match self.health_check().await {
            Ok(healthy) => healthy,
            Err(error) => {
                tracing::warn!(error = %error, event = "health_check_failed", "Redis health check failed");
                false
            }
        }
    }
}
