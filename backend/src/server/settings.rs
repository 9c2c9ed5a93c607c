//! Application settings loaded via OrthoConfig.
//!
//! Values merge CLI flags, `RENTALS_*` environment variables, and config
//! files. Optional fields fall back to the defaults below through accessor
//! methods.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use rentals::inbound::http::session_config::{SESSION_KEY_DEFAULT_PATH, SessionToggles};
use rentals::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SAME_SITE: &str = "lax";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind host is not an IP address.
    #[error("invalid bind host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RENTALS")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving (default `true`).
    pub run_migrations: Option<bool>,
    /// File holding the shared session key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure` (default `true`).
    pub session_cookie_secure: Option<bool>,
    /// `SameSite` policy: `lax`, `strict`, or `none`.
    pub session_same_site: Option<String>,
    /// Permit a generated session key when the key file is unreadable.
    pub session_allow_ephemeral: Option<bool>,
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidHost`] when `host` is not an IP
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip = host
            .parse::<IpAddr>()
            .map_err(|source| SettingsError::InvalidHost {
                host: host.to_owned(),
                source,
            })?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Whether pending migrations run at startup.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Pool configuration when a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url).with_max_size(
                self.db_max_connections
                    .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            )
        })
    }

    /// Session toggles for validation against the build mode.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self
                .session_key_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH)),
            cookie_secure: self.session_cookie_secure.unwrap_or(true),
            same_site: self
                .session_same_site
                .clone()
                .unwrap_or_else(|| DEFAULT_SAME_SITE.to_owned()),
            allow_ephemeral: self.session_allow_ephemeral.unwrap_or(false),
        }
    }
}
