use anyhow::Context;
use skybook_api::{app, AppState};
use skybook_store::app_config::{Config, StorageBackend};
use skybook_store::{
    seed, DbClient, InMemoryStore, PostgresBookingRepository, PostgresFlightRepository,
    PostgresReferenceRepository, RedisClient,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skybook_api=debug,skybook_order=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Skybook API on port {}", config.server.port);

    let mut app_state = match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("database.url is required for the postgres backend")?;
            let db = DbClient::new(url, &config.database)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }

            AppState::new(
                Arc::new(PostgresReferenceRepository::new(db.pool.clone())),
                Arc::new(PostgresFlightRepository::new(db.pool.clone())),
                Arc::new(PostgresBookingRepository::new(db.pool.clone())),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage seeded with demo data");
            let store = InMemoryStore::new();
            seed::seed_demo(&store);
            AppState::in_memory(store)
        }
    };

    if let Some(url) = config.redis.url.as_deref() {
        let redis = RedisClient::new(url).context("Invalid Redis URL")?;
        app_state = app_state.with_rate_limit(Arc::new(redis), config.rate_limit.clone());
    } else {
        tracing::info!("Rate limiting disabled: no Redis URL configured");
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
