//! Service entry-point: loads settings, prepares storage, and serves the API,
//! the notification socket, and the health probes.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rentals::inbound::http::health::HealthState;
use rentals::inbound::http::session_config::{BuildMode, session_settings};
use rentals::outbound::notifications::PresenceRegistry;
use rentals::outbound::persistence::{DbPool, run_pending_migrations};

mod server;

use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load configuration")?;
    let session = session_settings(
        &settings.session_toggles(),
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("invalid session configuration")?;
    let bind_addr = settings.bind_addr()?;

    let health_state = web::Data::new(HealthState::new());
    let presence = Arc::new(PresenceRegistry::new());
    let mut config = ServerConfig::new(session, bind_addr);

    if let Some(pool_config) = settings.pool_config() {
        if settings.run_migrations() {
            let applied = run_pending_migrations(pool_config.database_url())
                .await
                .wrap_err("failed to apply migrations")?;
            info!(applied, "migrations up to date");
        }
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        let metrics = server::build_metrics(Arc::clone(&presence))
            .wrap_err("failed to configure metrics")?;
        config = config.with_metrics(Some(metrics));
    }

    let server = create_server(health_state.clone(), presence, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    health_state.mark_ready();
    info!(%bind_addr, "listening");

    server.await.wrap_err("server terminated with an error")
}
