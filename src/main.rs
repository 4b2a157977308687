//! Logbook Admin server

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use logbook_admin::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{SqlxCurriculumRepository, SqlxDocumentRepository},
    },
    logging,
    services::{CurriculumService, ReviewService},
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(logging::DEFAULT_SERVER_FILTER);

    tracing::info!("Starting Logbook Admin...");

    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized (ttl {}s)", config.cache.ttl_seconds);

    let review_service = Arc::new(ReviewService::new(
        SqlxDocumentRepository::boxed(pool.clone()),
        cache,
    ));
    let curriculum_service = Arc::new(CurriculumService::new(SqlxCurriculumRepository::boxed(
        pool.clone(),
    )));

    let state = AppState {
        pool: pool.clone(),
        review_service,
        curriculum_service,
    };

    let app = api::build_router(state, &config.server.cors_origin)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
