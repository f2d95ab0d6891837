use attendanced::config::ServerConfig;
use attendanced::{db, http};
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::parse();
    config.validate()?;

    let conn = db::open_db(&config.data_dir)?;
    let database = db::db_path(&config.data_dir);
    info!("Opened attendance database at {}", database.display());

    let state = http::AppState::new(conn, Some(database))
        .with_request_timeout(config.request_timeout());
    let app = http::app(state, &config.base_path);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("attendanced listening on {}{}", config.listen, config.base_path);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
