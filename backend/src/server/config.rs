//! Application settings and the HTTP server configuration object.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use lending_backend::outbound::persistence::{DbPool, PoolConfig};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Settings layered from CLI arguments, `LENDING_*` environment variables and
/// an optional configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LENDING")]
pub struct AppSettings {
    /// Interface to listen on. Defaults to all interfaces.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// File holding the cookie signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy: `strict`, `lax` or `none`.
    pub same_site: Option<String>,
    /// Allow a generated key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_key: bool,
}

impl AppSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Session key location, falling back to the mounted secret path.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        let config = PoolConfig::new(url);
        Some(match self.pool_max_size {
            Some(size) => config.with_max_size(size),
            None => config,
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from session and binding settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
        }
    }

    /// Serve from PostgreSQL instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "LENDING_HOST",
        "LENDING_PORT",
        "LENDING_DATABASE_URL",
        "LENDING_POOL_MAX_SIZE",
        "LENDING_SESSION_KEY_FILE",
        "LENDING_COOKIE_SECURE",
        "LENDING_SAME_SITE",
        "LENDING_ALLOW_EPHEMERAL_KEY",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("lending-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(
            settings.session_key_file(),
            PathBuf::from(DEFAULT_SESSION_KEY_FILE)
        );
        assert!(settings.pool_config().is_none());
        assert!(!settings.allow_ephemeral_key);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("LENDING_HOST", Some("127.0.0.1".to_owned())),
            ("LENDING_PORT", Some("9000".to_owned())),
            (
                "LENDING_DATABASE_URL",
                Some("postgres://lender:secret@db/lending".to_owned()),
            ),
            ("LENDING_POOL_MAX_SIZE", Some("4".to_owned())),
            ("LENDING_SESSION_KEY_FILE", Some("/tmp/lending_key".to_owned())),
            ("LENDING_COOKIE_SECURE", None),
            ("LENDING_SAME_SITE", Some("strict".to_owned())),
            ("LENDING_ALLOW_EPHEMERAL_KEY", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            SocketAddr::from(([127, 0, 0, 1], 9000))
        );
        assert_eq!(settings.session_key_file(), PathBuf::from("/tmp/lending_key"));
        assert_eq!(settings.same_site.as_deref(), Some("strict"));
        assert!(settings.allow_ephemeral_key);
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.redacted_url(), "postgres://lender:***@db/lending");
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let _guard = lock_env(VARS.map(|name| match name {
            "LENDING_DATABASE_URL" => (name, Some("  ".to_owned())),
            _ => (name, None),
        }));

        assert!(load_from_empty_args().pool_config().is_none());
    }
}
