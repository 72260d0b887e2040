//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use diesel::{Connection, PgConnection};
use diesel_migrations::MigrationHarness;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lending_backend::inbound::http::health::HealthState;
use lending_backend::outbound::persistence::{DbPool, MIGRATIONS, PoolConfig};
use ortho_config::OrthoConfig;

use server::{AppSettings, BuildMode, ServerConfig, create_server, key_fingerprint};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = server::session_settings(&settings, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let bind_addr = settings.bind_addr();
    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );
    match settings.pool_config() {
        Some(pool_config) => {
            config = config.with_db_pool(prepare_database(pool_config).await?);
        }
        None => warn!("no database_url configured; data is kept in memory"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}

/// Apply pending migrations, then open the async pool.
async fn prepare_database(config: PoolConfig) -> std::io::Result<DbPool> {
    info!(database = %config.redacted_url(), "connecting to database");
    let url = config.database_url().to_owned();
    let applied = web::block(move || run_migrations(&url))
        .await
        .map_err(std::io::Error::other)??;
    info!(applied, "database migrations complete");
    DbPool::new(config).await.map_err(std::io::Error::other)
}

fn run_migrations(url: &str) -> std::io::Result<usize> {
    let mut conn = PgConnection::establish(url).map_err(std::io::Error::other)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|versions| versions.len())
        .map_err(|e| std::io::Error::other(e.to_string()))
}
