use crate::config::AppConfig;
use crate::errors::ServiceError;
use migrations::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for the shared connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for the database connection pool
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Establishes the pool from application configuration.
pub async fn connect(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    connect_with(&DbConfig {
        url: cfg.database_url.clone(),
        ..Default::default()
    })
    .await
}

/// Single-connection pool. In-memory SQLite databases are per-connection, so
/// tests against `sqlite::memory:` must not fan out across a pool.
pub async fn connect_single(url: &str) -> Result<DbPool, ServiceError> {
    connect_with(&DbConfig {
        url: url.to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    })
    .await
}

pub async fn connect_with(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("configuring database connection: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    info!(
        "connecting to database with max_connections={}",
        config.max_connections
    );

    let pool = Database::connect(opt).await?;
    Ok(pool)
}

/// Applies any pending migrations. Idempotent; runs once at startup rather
/// than on every request.
pub async fn run_migrations(db: &DbPool) -> Result<(), ServiceError> {
    info!("running pending migrations");
    Migrator::up(db, None).await?;
    Ok(())
}
