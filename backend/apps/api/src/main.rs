//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are mapped by the
//! ranking crate.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use chrono::FixedOffset;
use ranking::{
    InMemoryRankingRepository, PgRankingRepository, RankingConfig, ranking_router,
    ranking_router_generic,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse an optional env var, failing startup on malformed values
fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} is not valid: {raw:?}")),
        Err(_) => Ok(None),
    }
}

fn ranking_config_from_env() -> anyhow::Result<RankingConfig> {
    let mut config = RankingConfig::development();

    if let Some(max_limit) = env_parse::<u32>("RANKING_MAX_LIMIT")? {
        anyhow::ensure!(max_limit > 0, "RANKING_MAX_LIMIT must be positive");
        config.max_limit = max_limit;
    }
    if let Some(cap) = env_parse::<u32>("RANKING_SNAPSHOT_CAP")? {
        config.snapshot_cap = cap;
    }
    if let Some(minutes) = env_parse::<i32>("RANKING_UTC_OFFSET_MINUTES")? {
        config.utc_offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("RANKING_UTC_OFFSET_MINUTES out of range: {minutes}"))?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,ranking=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ranking_config_from_env()?;
    tracing::info!(
        max_limit = config.max_limit,
        snapshot_cap = config.snapshot_cap,
        utc_offset = %config.utc_offset,
        "Ranking configuration loaded"
    );

    let ranking = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .context("connecting to DATABASE_URL")?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            ranking_router(PgRankingRepository::new(pool), config)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            ranking_router_generic(InMemoryRankingRepository::new(), config)
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", ranking)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env_parse("BIND_ADDR")?
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 31113)));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
