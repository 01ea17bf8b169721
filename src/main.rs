use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use watchlisty_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgStore},
    routes::create_router,
    services::TmdbClient,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Database pool and embedded migrations
    let db_pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&db_pool).await?;

    // Redis-backed metadata cache
    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client);

    let metadata = TmdbClient::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        Duration::from_secs(config.tmdb_timeout_secs),
    )?;

    let state = AppState {
        store: Arc::new(PgStore::new(db_pool)),
        metadata: Arc::new(metadata),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "WatchListy API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
