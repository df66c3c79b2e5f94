use std::net::SocketAddr;
use std::str::FromStr;

use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Address the admin API binds to (default: 0.0.0.0:3000)
    pub api_bind_addr: SocketAddr,

    /// Maximum number of tasks a dispatcher pulls per poll (default: 50)
    pub dispatcher_batch_size: i64,

    /// Sleep between dispatcher polls when the queue is drained, in milliseconds (default: 1000)
    pub dispatcher_poll_interval_ms: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20)?,
            api_bind_addr: env_or("API_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            dispatcher_batch_size: env_or("DISPATCHER_BATCH_SIZE", 50)?,
            dispatcher_poll_interval_ms: env_or("DISPATCHER_POLL_INTERVAL_MS", 1000)?,
        })
    }
}

/// Read `name` from the environment, falling back to `default` when unset.
fn env_or<T: FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            anyhow::anyhow!(
                "{} must be a valid {}",
                name,
                std::any::type_name::<T>()
            )
        }),
        Err(_) => Ok(default),
    }
}
