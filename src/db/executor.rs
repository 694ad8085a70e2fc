//! Statement execution engine.
//!
//! Every call acquires its own pooled connection, runs exactly one statement
//! and hands the connection back when the guard drops, whatever the exit
//! path. Mutating statements run inside a transaction that commits on
//! success; an error drops the transaction, which rolls it back.
//!
//! # Architecture
//!
//! The executor uses database-specific implementations organized in submodules:
//! - `postgres`: PostgreSQL execution
//! - `sqlite`: SQLite execution
//!
//! Each submodule provides identical functionality adapted to the database's type system.

use crate::db::DatabaseType;
use crate::db::pool::DbPool;
use crate::db::sql::{Expect, Fragment, Statement};
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::impl_db_dispatch;
use crate::models::{Fields, ModelDescriptor};
use futures_util::StreamExt;
use std::time::Instant;
use tracing::debug;

/// Result of executing a [`Statement`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Fields>),
    Affected(u64),
}

impl Outcome {
    pub fn into_rows(self) -> DbResult<Vec<Fields>> {
        match self {
            Outcome::Rows(rows) => Ok(rows),
            Outcome::Affected(_) => Err(DbError::internal("Statement returned no rows")),
        }
    }

    pub fn rows_affected(&self) -> u64 {
        match self {
            Outcome::Rows(rows) => rows.len() as u64,
            Outcome::Affected(n) => *n,
        }
    }
}

/// Execute one statement on a freshly acquired connection.
///
/// Rows are decoded with `descriptor`.
pub async fn execute(
    pool: &DbPool,
    statement: &Statement,
    descriptor: &ModelDescriptor,
) -> DbResult<Outcome> {
    let start = Instant::now();

    debug!(
        table = descriptor.table,
        sql = %render_sql(pool.db_type(), statement),
        params = statement.params().count(),
        mutating = statement.mutating,
        "Executing statement"
    );

    let outcome = impl_db_dispatch!(pool, {
        Postgres(p) => postgres::execute(p, statement, descriptor).await,
        SQLite(p) => sqlite::execute(p, statement, descriptor).await,
    })?;

    debug!(
        table = descriptor.table,
        rows = outcome.rows_affected(),
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Statement finished"
    );

    Ok(outcome)
}

/// SQL text of `statement` as sent to a `db_type` backend.
pub fn render_sql(db_type: DatabaseType, statement: &Statement) -> String {
    match db_type {
        DatabaseType::PostgreSQL => postgres::builder(statement).sql().to_string(),
        DatabaseType::SQLite => sqlite::builder(statement).sql().to_string(),
    }
}

// =============================================================================
// Common Helper Functions
// =============================================================================

fn collect_rows<R>(results: Vec<Result<R, sqlx::Error>>) -> DbResult<Vec<R>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(DbError::from)?);
    }
    Ok(rows)
}

fn decode_rows<R: RowToJson>(rows: &[R], descriptor: &ModelDescriptor) -> DbResult<Vec<Fields>> {
    rows.iter().map(|row| row.to_fields(descriptor)).collect()
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its database type.
// The code structure is intentionally parallel to make differences obvious.

mod postgres {
    use super::*;
    use crate::db::params::push_postgres_param;
    use sqlx::postgres::PgRow;
    use sqlx::{Connection, PgConnection, PgPool, Postgres, QueryBuilder};

    pub async fn execute(
        pool: &PgPool,
        statement: &Statement,
        descriptor: &ModelDescriptor,
    ) -> DbResult<Outcome> {
        let mut conn = pool.acquire().await?;
        let result = run(&mut conn, statement, descriptor).await;
        if let Err(e) = &result {
            if e.is_transient() {
                // Don't hand a broken connection back to the pool
                conn.close_on_drop();
            }
        }
        result
    }

    async fn run(
        conn: &mut PgConnection,
        statement: &Statement,
        descriptor: &ModelDescriptor,
    ) -> DbResult<Outcome> {
        if statement.mutating {
            let mut tx = conn.begin().await?;
            let outcome = query(&mut tx, statement, descriptor).await?;
            tx.commit().await?;
            Ok(outcome)
        } else {
            query(conn, statement, descriptor).await
        }
    }

    /// Replay the statement into a query builder, which numbers and binds
    /// the placeholders.
    pub fn builder(statement: &Statement) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("");
        for fragment in statement.fragments() {
            match fragment {
                Fragment::Sql(sql) => {
                    builder.push(sql);
                }
                Fragment::Bind(param) => push_postgres_param(&mut builder, param),
            }
        }
        builder
    }

    async fn query(
        conn: &mut PgConnection,
        statement: &Statement,
        descriptor: &ModelDescriptor,
    ) -> DbResult<Outcome> {
        let mut query_builder = builder(statement);
        let query = query_builder.build();

        match statement.expect {
            Expect::Rows { limit: Some(limit) } => {
                let results = query.fetch(&mut *conn).take(limit).collect::<Vec<_>>().await;
                let rows: Vec<PgRow> = collect_rows(results)?;
                Ok(Outcome::Rows(decode_rows(&rows, descriptor)?))
            }
            Expect::Rows { limit: None } => {
                let rows = query.fetch_all(&mut *conn).await?;
                Ok(Outcome::Rows(decode_rows(&rows, descriptor)?))
            }
            Expect::RowsAffected => {
                let result = query.execute(&mut *conn).await?;
                Ok(Outcome::Affected(result.rows_affected()))
            }
        }
    }
}

mod sqlite {
    use super::*;
    use crate::db::params::push_sqlite_param;
    use sqlx::sqlite::SqliteRow;
    use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

    pub async fn execute(
        pool: &SqlitePool,
        statement: &Statement,
        descriptor: &ModelDescriptor,
    ) -> DbResult<Outcome> {
        let mut conn = pool.acquire().await?;
        let result = run(&mut conn, statement, descriptor).await;
        if let Err(e) = &result {
            if e.is_transient() {
                // Don't hand a broken connection back to the pool
                conn.close_on_drop();
            }
        }
        result
    }

    async fn run(
        conn: &mut SqliteConnection,
        statement: &Statement,
        descriptor: &ModelDescriptor,
    ) -> DbResult<Outcome> {
        if statement.mutating {
            let mut tx = conn.begin().await?;
            let outcome = query(&mut tx, statement, descriptor).await?;
            tx.commit().await?;
            Ok(outcome)
        } else {
            query(conn, statement, descriptor).await
        }
    }

    /// Replay the statement into a query builder, which numbers and binds
    /// the placeholders.
    pub fn builder(statement: &Statement) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new("");
        for fragment in statement.fragments() {
            match fragment {
                Fragment::Sql(sql) => {
                    builder.push(sql);
                }
                Fragment::Bind(param) => push_sqlite_param(&mut builder, param),
            }
        }
        builder
    }

    async fn query(
        conn: &mut SqliteConnection,
        statement: &Statement,
        descriptor: &ModelDescriptor,
    ) -> DbResult<Outcome> {
        let mut query_builder = builder(statement);
        let query = query_builder.build();

        match statement.expect {
            Expect::Rows { limit: Some(limit) } => {
                let results = query.fetch(&mut *conn).take(limit).collect::<Vec<_>>().await;
                let rows: Vec<SqliteRow> = collect_rows(results)?;
                Ok(Outcome::Rows(decode_rows(&rows, descriptor)?))
            }
            Expect::Rows { limit: None } => {
                let rows = query.fetch_all(&mut *conn).await?;
                Ok(Outcome::Rows(decode_rows(&rows, descriptor)?))
            }
            Expect::RowsAffected => {
                let result = query.execute(&mut *conn).await?;
                Ok(Outcome::Affected(result.rows_affected()))
            }
        }
    }
}
