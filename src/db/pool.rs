//! Connection pool management.
//!
//! This module provides connection pooling functionality using database-specific
//! pools (PgPool, SqlitePool) to ensure full type support. A [`Database`] is
//! built once at startup from [`DatabaseSettings`] and shared by reference
//! (`Arc`) with every DAO.

use crate::config::DatabaseSettings;
use crate::db::DatabaseType;
use crate::db::executor::{self, Outcome};
use crate::db::sql::Statement;
use crate::error::{DbError, DbResult};
use crate::models::ModelDescriptor;
use sqlx::{
    PgPool, SqlitePool, postgres::PgPoolOptions, sqlite::SqliteConnectOptions,
    sqlite::SqlitePoolOptions,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Database-specific connection pool (avoids AnyPool limitations).
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    SQLite(SqlitePool),
}

impl DbPool {
    /// Close the connection pool.
    pub async fn close(&self) {
        match self {
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::SQLite(pool) => pool.close().await,
        }
    }

    /// Get the database type for this pool.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbPool::Postgres(_) => DatabaseType::PostgreSQL,
            DbPool::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

/// Live handle to the application database.
#[derive(Debug)]
pub struct Database {
    pool: DbPool,
    server_version: Option<String>,
}

impl Database {
    /// Connect to the database described by `settings`.
    pub async fn connect(settings: &DatabaseSettings) -> DbResult<Self> {
        info!(
            db_type = %settings.db_type,
            database = ?settings.database,
            "Connecting to database"
        );

        let pool = create_pool(settings).await?;
        let server_version = get_server_version(&pool).await;

        info!(server_version = ?server_version, "Connected successfully");

        Ok(Self {
            pool,
            server_version,
        })
    }

    pub fn db_type(&self) -> DatabaseType {
        self.pool.db_type()
    }

    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    /// Execute one statement on a fresh connection, decoding rows with `descriptor`.
    pub async fn execute(
        &self,
        statement: &Statement,
        descriptor: &ModelDescriptor,
    ) -> DbResult<Outcome> {
        executor::execute(&self.pool, statement, descriptor).await
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }
}

/// Create a connection pool for the given settings.
async fn create_pool(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let pool_opts = &settings.pool_options;
    let is_sqlite = settings.db_type == DatabaseType::SQLite;
    let acquire_timeout = Duration::from_secs(pool_opts.acquire_timeout_or_default());
    let idle_timeout = Some(Duration::from_secs(pool_opts.idle_timeout_or_default()));

    match settings.db_type {
        DatabaseType::PostgreSQL => {
            let pool = PgPoolOptions::new()
                .min_connections(pool_opts.min_connections_or_default())
                .max_connections(pool_opts.max_connections_or_default(is_sqlite))
                .acquire_timeout(acquire_timeout)
                .idle_timeout(idle_timeout)
                .test_before_acquire(pool_opts.test_before_acquire_or_default())
                .connect(&settings.connection_string)
                .await
                .map_err(|e| {
                    DbError::connection(
                        format!("Failed to connect: {}", e),
                        connection_suggestion(settings.db_type, &e),
                    )
                })?;
            Ok(DbPool::Postgres(pool))
        }
        DatabaseType::SQLite => {
            let options = SqliteConnectOptions::from_str(&settings.connection_string)
                .map_err(|e| {
                    DbError::connection(
                        format!("Invalid SQLite connection string: {}", e),
                        "Check the connection URL format: sqlite:path/to/db.sqlite",
                    )
                })?
                .create_if_missing(true);

            let pool = SqlitePoolOptions::new()
                .min_connections(pool_opts.min_connections_or_default())
                .max_connections(pool_opts.max_connections_or_default(is_sqlite))
                .acquire_timeout(acquire_timeout)
                .idle_timeout(idle_timeout)
                .test_before_acquire(pool_opts.test_before_acquire_or_default())
                .connect_with(options)
                .await
                .map_err(|e| {
                    DbError::connection(
                        format!("Failed to connect: {}", e),
                        connection_suggestion(settings.db_type, &e),
                    )
                })?;
            Ok(DbPool::SQLite(pool))
        }
    }
}

/// Get the server version from the connected database.
async fn get_server_version(pool: &DbPool) -> Option<String> {
    let result = match pool {
        DbPool::Postgres(pool) => {
            sqlx::query_scalar::<_, String>("SELECT version()")
                .fetch_one(pool)
                .await
        }
        DbPool::SQLite(pool) => {
            sqlx::query_scalar::<_, String>("SELECT sqlite_version()")
                .fetch_one(pool)
                .await
        }
    };

    match result {
        Ok(version) => {
            debug!(version = %version, "Got server version");
            Some(version)
        }
        Err(e) => {
            warn!(error = %e, "Failed to get server version");
            None
        }
    }
}

/// Suggestion text for a failed connection attempt.
fn connection_suggestion(db_type: DatabaseType, err: &sqlx::Error) -> &'static str {
    match (db_type, err) {
        (_, sqlx::Error::PoolTimedOut) => {
            "The database did not accept a connection in time. Check that the server is running"
        }
        (DatabaseType::PostgreSQL, sqlx::Error::Database(_)) => {
            "Check DB_USER, DB_PASS and DB_NAME and that the database exists"
        }
        (DatabaseType::PostgreSQL, _) => "Check DB_HOST and DB_PORT and network connectivity",
        (DatabaseType::SQLite, _) => "Check that the SQLite file path is writable",
    }
}
