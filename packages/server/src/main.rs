use std::net::SocketAddr;

use anyhow::Context;
use tracing::{Level, info};

use server::config::AppConfig;
use server::state::AppState;
use server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config
        .engagement
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid engagement scoring policy")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;
    seed::seed_active_event_slot(&db)
        .await
        .context("Failed to seed active event slot")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host/server.port")?;

    let app = build_router(AppState::new(db, config));

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
