// Database configuration and connection
// Settings come from the environment, optionally seeded from a .env file

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};

use crate::domain::errors::{DomainError, DomainResult};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PORT: u16 = 5432;

/// Where the connection settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSource {
    /// A full connection URL from `DATABASE_URL`
    Url(String),
    /// Individual `DB_*` settings, passed to the driver without going through a URL
    Parts(ConnectionParts),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParts {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub source: ConnectionSource,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Loads settings from the process environment after reading `.env`
    ///
    /// `DATABASE_URL` wins when set. Otherwise the settings are taken from
    /// `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and
    /// `DB_SSLMODE`, each with a local development default.
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_err() {
            tracing::debug!("No .env file found, using process environment");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let source = match lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            Some(url) => ConnectionSource::Url(url),
            None => {
                let port = match lookup("DB_PORT").filter(|v| !v.is_empty()) {
                    Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                        tracing::warn!("DB_PORT is not a valid port, using {}", DEFAULT_PORT);
                        DEFAULT_PORT
                    }),
                    None => DEFAULT_PORT,
                };

                ConnectionSource::Parts(ConnectionParts {
                    host: var("DB_HOST", "localhost"),
                    port,
                    user: var("DB_USER", "postgres"),
                    password: var("DB_PASSWORD", "postgres"),
                    database: var("DB_NAME", "km_api"),
                    ssl_mode: var("DB_SSLMODE", "disable"),
                })
            }
        };

        let max_connections = match lookup("DB_MAX_CONNECTIONS").map(|v| v.parse::<u32>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                tracing::warn!(
                    "DB_MAX_CONNECTIONS is not a positive integer, using {}",
                    DEFAULT_MAX_CONNECTIONS
                );
                DEFAULT_MAX_CONNECTIONS
            }
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Self {
            source,
            max_connections,
        }
    }

    /// Driver options for these settings
    ///
    /// Credentials from the `DB_*` settings are handed over verbatim, so
    /// URL metacharacters in them need no escaping.
    pub fn connect_options(&self) -> DomainResult<PgConnectOptions> {
        match &self.source {
            ConnectionSource::Url(url) => PgConnectOptions::from_str(url)
                .map_err(|e| DomainError::validation(format!("invalid DATABASE_URL: {e}"))),
            ConnectionSource::Parts(parts) => {
                let ssl_mode = PgSslMode::from_str(&parts.ssl_mode).map_err(|e| {
                    DomainError::validation(format!("invalid DB_SSLMODE {}: {e}", parts.ssl_mode))
                })?;

                Ok(PgConnectOptions::new()
                    .host(&parts.host)
                    .port(parts.port)
                    .username(&parts.user)
                    .password(&parts.password)
                    .database(&parts.database)
                    .ssl_mode(ssl_mode))
            }
        }
    }
}

/// Opens the connection pool shared by the PostgreSQL repositories
pub async fn connect(config: &DatabaseConfig) -> DomainResult<PgPool> {
    let options = config.connect_options()?;

    tracing::info!(
        max_connections = config.max_connections,
        "Connecting to database..."
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| DomainError::storage(format!("failed to connect to database: {e}")))?;

    tracing::info!("Database connected successfully");
    Ok(pool)
}

/// Round-trips a trivial query to check the pool is usable
pub async fn ping(pool: &PgPool) -> DomainResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| DomainError::storage(format!("failed to ping database: {e}")))?;
    Ok(())
}
