//! Fixture loading.
//!
//! A seed file is a JSON object keyed by table name, each holding an array of
//! records: `{"test-models": [{"info": "hello"}]}`. Records go through
//! [`Table::create`], so generated identifiers are filled in as usual.

use crate::dao::Table;
use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::models::ModelDescriptor;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Insert every record of the seed file at `path`, tables in `descriptors`
/// order. Returns the number of records inserted.
pub async fn seed_from_file(
    db: Arc<Database>,
    descriptors: &[&'static ModelDescriptor],
    path: &Path,
) -> DbResult<usize> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        DbError::invalid_input(format!("Cannot read seed file {}: {}", path.display(), e))
    })?;
    let document: JsonValue = serde_json::from_str(&content).map_err(|e| {
        DbError::invalid_input(format!("Seed file {} is not valid JSON: {}", path.display(), e))
    })?;

    seed(db, descriptors, &document).await
}

/// Insert the records of an already parsed seed document.
pub async fn seed(
    db: Arc<Database>,
    descriptors: &[&'static ModelDescriptor],
    document: &JsonValue,
) -> DbResult<usize> {
    let tables = document
        .as_object()
        .ok_or_else(|| DbError::invalid_input("Seed document must be an object keyed by table"))?;

    if let Some(unknown) = tables
        .keys()
        .find(|name| !descriptors.iter().any(|d| d.table == name.as_str()))
    {
        return Err(DbError::schema(
            format!("Unknown table '{}' in seed document", unknown),
            unknown.clone(),
        ));
    }

    let mut total = 0;
    for descriptor in descriptors {
        let Some(records) = tables.get(descriptor.table) else {
            continue;
        };
        let records = records.as_array().ok_or_else(|| {
            DbError::invalid_input(format!(
                "Seed entry '{}' must be an array of records",
                descriptor.table
            ))
        })?;

        let table = Table::new(db.clone(), *descriptor);
        for record in records {
            let values = record.as_object().ok_or_else(|| {
                DbError::invalid_input(format!(
                    "Seed records for '{}' must be objects",
                    descriptor.table
                ))
            })?;
            table.create(values).await?;
        }

        info!(table = descriptor.table, count = records.len(), "Seeded table");
        total += records.len();
    }

    Ok(total)
}
