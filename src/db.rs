use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema,
};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::entities;

/// Database connection pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://souq.db?mode=rwc".to_string(),
            max_connections: 16,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
            sqlx_logging: false,
        }
    }
}

impl DbConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            url: config.database_url.clone(),
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            connect_timeout: Duration::from_secs(config.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(config.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
            sqlx_logging: config.is_development(),
        }
    }
}

/// Establishes a pooled database connection.
pub async fn establish_connection_with_config(cfg: DbConfig) -> Result<DatabaseConnection, DbErr> {
    info!(
        max_connections = cfg.max_connections,
        "Connecting to database"
    );

    let mut options = ConnectOptions::new(cfg.url);
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(cfg.connect_timeout)
        .idle_timeout(cfg.idle_timeout)
        .acquire_timeout(cfg.acquire_timeout)
        .sqlx_logging(cfg.sqlx_logging);

    let conn = Database::connect(options).await?;
    debug!("Database connection established");
    Ok(conn)
}

/// Establishes a connection using the application configuration.
pub async fn establish_connection_from_app_config(
    config: &AppConfig,
) -> Result<DatabaseConnection, DbErr> {
    establish_connection_with_config(DbConfig::from_app_config(config)).await
}

/// Creates any missing tables from the entity definitions.
///
/// Statements are generated per-backend, so the same code path serves the
/// SQLite test databases and Postgres deployments.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(entities::user::Entity),
        schema.create_table_from_entity(entities::address::Entity),
        schema.create_table_from_entity(entities::wishlist::Entity),
        schema.create_table_from_entity(entities::order::Entity),
        schema.create_table_from_entity(entities::payment_transaction::Entity),
        schema.create_table_from_entity(entities::status_check::Entity),
    ];

    for stmt in statements.iter_mut() {
        stmt.if_not_exists();
        db.execute(builder.build(&*stmt)).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}
