//! SmartControl Server - Main entry point

use anyhow::Result;
use smartcontrol_common::logging::{init_logging, LogConfig};
use std::net::SocketAddr;
use tracing::info;

use smartcontrol_server::{
    config::Config,
    db,
    features::{users, FeatureState},
    server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("smartcontrol-server")
        .filter_directives("smartcontrol_server=debug,tower_http=debug,sqlx=warn")
        .build();

    // Environment variables take precedence
    let log_config = log_config.with_env_overrides()?;

    // Held until exit so buffered file output is flushed
    let _log_guard = init_logging(&log_config)?;

    info!("Starting SmartControl Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    tokio::fs::create_dir_all(&config.uploads.dir).await?;
    info!(dir = %config.uploads.dir.display(), "Upload directory ready");

    let state = FeatureState::new(pool.clone(), &config);
    users::bootstrap_admin(&pool, &state.recorder, &config.bootstrap).await?;

    let app = server::create_app(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}
