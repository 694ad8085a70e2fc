//! `db` subcommand actions.

use crate::config::DbAction;
use crate::dao::seed::seed_from_file;
use crate::db::Database;
use crate::db::schema::{create_tables, drop_tables};
use crate::error::DbResult;
use crate::models::registry;
use std::sync::Arc;
use tracing::info;

/// Run one schema management action against every registered table.
pub async fn run_db_action(db: Arc<Database>, action: &DbAction) -> DbResult<()> {
    let tables = registry();
    match action {
        DbAction::Create => {
            create_tables(&db, tables).await?;
            info!("DB create success");
        }
        DbAction::Drop => {
            drop_tables(&db, tables).await?;
            info!("DB drop success");
        }
        DbAction::Seed { file } => {
            let count = seed_from_file(db, tables, file).await?;
            info!(records = count, "DB seed success");
        }
        DbAction::Setup { seed } => {
            drop_tables(&db, tables).await?;
            create_tables(&db, tables).await?;
            if let Some(file) = seed {
                let count = seed_from_file(db.clone(), tables, file).await?;
                info!(records = count, "DB seed success");
            }
            info!("DB setup success");
        }
    }
    Ok(())
}
