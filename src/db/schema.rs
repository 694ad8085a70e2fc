//! Schema management.
//!
//! DDL is generated from [`ModelDescriptor`]s with dialect-aware column types.
//! Tables are created in registry order and dropped in reverse.

use crate::db::DatabaseType;
use crate::db::pool::Database;
use crate::db::sql::{Statement, quote_ident};
use crate::error::DbResult;
use crate::models::{FieldDef, FieldDefault, FieldKind, ModelDescriptor};
use tracing::info;

/// Column type for `kind` in the given dialect.
fn column_type(db_type: DatabaseType, kind: FieldKind) -> &'static str {
    match (db_type, kind) {
        (DatabaseType::PostgreSQL, FieldKind::Uuid) => "UUID",
        (DatabaseType::PostgreSQL, FieldKind::Text) => "TEXT",
        (DatabaseType::PostgreSQL, FieldKind::Integer) => "BIGINT",
        (DatabaseType::PostgreSQL, FieldKind::Float) => "DOUBLE PRECISION",
        (DatabaseType::PostgreSQL, FieldKind::Boolean) => "BOOLEAN",
        (DatabaseType::PostgreSQL, FieldKind::Json) => "JSONB",
        (DatabaseType::PostgreSQL, FieldKind::Timestamp) => "TIMESTAMPTZ",
        (DatabaseType::SQLite, FieldKind::Uuid | FieldKind::Text | FieldKind::Json) => "TEXT",
        (DatabaseType::SQLite, FieldKind::Integer) => "INTEGER",
        (DatabaseType::SQLite, FieldKind::Float) => "REAL",
        (DatabaseType::SQLite, FieldKind::Boolean) => "BOOLEAN",
        (DatabaseType::SQLite, FieldKind::Timestamp) => "DATETIME",
    }
}

fn column_def(db_type: DatabaseType, field: &FieldDef, single_pk: bool) -> String {
    let name = quote_ident(field.name);
    let identity = field.default == Some(FieldDefault::Identity);

    // SQLite only autoincrements an inline INTEGER PRIMARY KEY
    if identity && single_pk && db_type == DatabaseType::SQLite {
        return format!("{name} INTEGER PRIMARY KEY AUTOINCREMENT");
    }

    let mut def = format!("{name} {}", column_type(db_type, field.kind));
    if identity && db_type == DatabaseType::PostgreSQL {
        def.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }
    if !field.nullable && !field.primary_key {
        def.push_str(" NOT NULL");
    }
    def
}

/// `CREATE TABLE IF NOT EXISTS` for one descriptor.
pub fn create_table_sql(db_type: DatabaseType, descriptor: &ModelDescriptor) -> String {
    let pk: Vec<&str> = descriptor.primary_key().map(|f| f.name).collect();
    let single_pk = pk.len() == 1;

    let mut columns: Vec<String> = descriptor
        .fields
        .iter()
        .map(|f| column_def(db_type, f, single_pk))
        .collect();

    let inline_pk = single_pk
        && db_type == DatabaseType::SQLite
        && descriptor
            .primary_key()
            .any(|f| f.default == Some(FieldDefault::Identity));
    if !pk.is_empty() && !inline_pk {
        let pk_cols: Vec<String> = pk.iter().map(|c| quote_ident(c)).collect();
        columns.push(format!("PRIMARY KEY ({})", pk_cols.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(descriptor.table),
        columns.join(", ")
    )
}

/// `DROP TABLE IF EXISTS` for one descriptor.
pub fn drop_table_sql(descriptor: &ModelDescriptor) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(descriptor.table))
}

/// Create every table in `descriptors`, skipping existing ones.
pub async fn create_tables(db: &Database, descriptors: &[&ModelDescriptor]) -> DbResult<()> {
    for descriptor in descriptors {
        let sql = create_table_sql(db.db_type(), descriptor);
        db.execute(&Statement::raw(sql), descriptor).await?;
        info!(table = descriptor.table, "Table created");
    }
    Ok(())
}

/// Drop every table in `descriptors`, in reverse order.
pub async fn drop_tables(db: &Database, descriptors: &[&ModelDescriptor]) -> DbResult<()> {
    for descriptor in descriptors.iter().rev() {
        db.execute(&Statement::raw(drop_table_sql(descriptor)), descriptor)
            .await?;
        info!(table = descriptor.table, "Table dropped");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{INTERESTS, TEST_MODELS};

    #[test]
    fn test_postgres_ddl_for_uuid_table() {
        assert_eq!(
            create_table_sql(DatabaseType::PostgreSQL, &TEST_MODELS),
            "CREATE TABLE IF NOT EXISTS \"test-models\" (\"test_id\" UUID, \
             \"info\" TEXT NOT NULL, PRIMARY KEY (\"test_id\"))"
        );
    }

    #[test]
    fn test_postgres_identity_column() {
        let sql = create_table_sql(DatabaseType::PostgreSQL, &INTERESTS);
        assert!(sql.contains("\"interest_id\" BIGINT GENERATED BY DEFAULT AS IDENTITY"));
        assert!(sql.contains("\"interest_name\" JSONB NOT NULL"));
        assert!(sql.contains("\"category\" JSONB,"));
        assert!(sql.ends_with("PRIMARY KEY (\"interest_id\"))"));
    }

    #[test]
    fn test_sqlite_identity_is_inline_autoincrement() {
        let sql = create_table_sql(DatabaseType::SQLite, &INTERESTS);
        assert!(sql.contains("\"interest_id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("\"interest_name\" TEXT NOT NULL"));
        assert!(!sql.contains("PRIMARY KEY (\"interest_id\")"));
    }

    #[test]
    fn test_drop_table_sql() {
        assert_eq!(
            drop_table_sql(&TEST_MODELS),
            "DROP TABLE IF EXISTS \"test-models\""
        );
    }

    #[tokio::test]
    async fn test_create_and_drop_tables_sqlite() {
        let settings = crate::config::DatabaseSettings::parse("sqlite::memory:").unwrap();
        let db = Database::connect(&settings).await.unwrap();
        let registry = crate::models::registry();

        create_tables(&db, registry).await.unwrap();
        // Idempotent
        create_tables(&db, registry).await.unwrap();
        drop_tables(&db, registry).await.unwrap();
        drop_tables(&db, registry).await.unwrap();
    }
}
