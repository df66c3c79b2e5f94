use std::sync::Arc;

use courier_common::config::AppConfig;
use courier_common::db;
use courier_dispatcher::{Dispatcher, LogDeliverer};
use courier_queue::{MessageTaskQueue, PgTaskRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier_dispatcher=info,courier_queue=info".into()),
        )
        .json()
        .init();

    tracing::info!("Courier dispatcher starting...");

    let config = AppConfig::from_env()?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    let queue = MessageTaskQueue::new(Arc::new(PgTaskRepository::new(pool)));
    let dispatcher = Dispatcher::new(
        queue,
        LogDeliverer,
        config.dispatcher_batch_size,
        config.dispatcher_poll_interval_ms,
    );

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        _ = dispatcher.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Courier dispatcher stopped.");
    Ok(())
}
