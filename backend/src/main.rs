//! Order Management - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use order_management::{
    config::{Config, LogFormat, StoreKind},
    create_app,
    store::{InMemoryOrderStore, OrderStore, PgOrderStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(config.log.format);

    tracing::info!("Starting Order Management Server");
    tracing::info!("Environment: {}", config.environment);

    let store = build_store(&config).await?;
    let transition_policy = config.orders.transition_policy.build();
    tracing::info!("Transition policy: {}", transition_policy.name());

    // Create application state
    let state = AppState::new(store, transition_policy);

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.host))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "order_server=debug,order_management=debug,tower_http=debug,sqlx=warn".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn OrderStore>> {
    match config.store.kind {
        StoreKind::Memory => {
            tracing::info!("Using in-memory order store with demo catalog");
            Ok(Arc::new(InMemoryOrderStore::demo()?))
        }
        StoreKind::Postgres => {
            // Create database connection pool
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(PgOrderStore::new(db_pool)))
        }
    }
}
