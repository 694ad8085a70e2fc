//! Untyped table access.
//!
//! [`Table`] runs the DAO operations for one descriptor and hands rows back
//! as [`Fields`]. It owns the per-call lifecycle: build the statement, run
//! it on a freshly acquired connection (retrying once on a lost
//! connection), and log any failure with the table and operation name.

use crate::dao::statements::{self, Page};
use crate::dao::transaction::{log_error, retry_once};
use crate::dao::{Criteria, localize};
use crate::db::{Database, Outcome, Statement};
use crate::error::{DbError, DbResult};
use crate::models::{Fields, ModelDescriptor};
use serde_json::Value as JsonValue;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Table {
    db: Arc<Database>,
    descriptor: &'static ModelDescriptor,
}

impl Table {
    pub fn new(db: Arc<Database>, descriptor: &'static ModelDescriptor) -> Self {
        Self { db, descriptor }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.table
    }

    /// The single row matching `criteria`, `None` when nothing matches.
    ///
    /// More than one match is [`DbError::MultipleRows`].
    pub async fn find_one_or_none(&self, criteria: &Criteria) -> DbResult<Option<Fields>> {
        const OP: &str = "find_one_or_none";
        self.logged(OP, async {
            let stmt = statements::select(self.descriptor, criteria, None, Some(2))?;
            let mut rows = self.run(OP, &stmt).await?.into_rows()?;
            if rows.len() > 1 {
                return Err(DbError::multiple_rows(self.name()));
            }
            Ok(rows.pop())
        })
        .await
    }

    /// Every row matching `criteria`.
    pub async fn find_all(&self, criteria: &Criteria) -> DbResult<Vec<Fields>> {
        const OP: &str = "find_all";
        self.logged(OP, async {
            let stmt = statements::select(self.descriptor, criteria, None, None)?;
            self.run(OP, &stmt).await?.into_rows()
        })
        .await
    }

    /// At most `limit` rows matching `criteria`, skipping `offset`, in primary
    /// key order.
    pub async fn get_paginated(
        &self,
        offset: u64,
        limit: u64,
        criteria: &Criteria,
    ) -> DbResult<Vec<Fields>> {
        const OP: &str = "get_paginated";
        self.logged(OP, async {
            let page = Page::new(offset, limit)?;
            let stmt = statements::select(self.descriptor, criteria, Some(page), None)?;
            self.run(OP, &stmt).await?.into_rows()
        })
        .await
    }

    /// Insert one record and return it as stored, generated values included.
    pub async fn create(&self, values: &Fields) -> DbResult<Fields> {
        const OP: &str = "create";
        self.logged(OP, async {
            let stmt = statements::insert(self.descriptor, values)?;
            self.run(OP, &stmt)
                .await?
                .into_rows()?
                .into_iter()
                .next()
                .ok_or_else(|| DbError::internal("INSERT returned no row"))
        })
        .await
    }

    /// Apply `patch` to the row identified by `id_field = id_value` and return
    /// the row as it is after the update, `None` when no row matched.
    pub async fn update_by_id(
        &self,
        id_field: &str,
        id_value: &JsonValue,
        patch: &Fields,
    ) -> DbResult<Option<Fields>> {
        const OP: &str = "update_by_id";
        self.logged(OP, async {
            let stmt = statements::update(self.descriptor, id_field, id_value, patch)?;
            Ok(self.run(OP, &stmt).await?.into_rows()?.into_iter().next())
        })
        .await
    }

    /// Delete the row identified by `id_field = id_value`. Returns whether
    /// anything was removed.
    pub async fn delete_by_id(&self, id_field: &str, id_value: &JsonValue) -> DbResult<bool> {
        const OP: &str = "delete_by_id";
        self.logged(OP, async {
            let stmt = statements::delete(self.descriptor, id_field, id_value)?;
            Ok(self.run(OP, &stmt).await?.rows_affected() > 0)
        })
        .await
    }

    /// Every row with its multilanguage fields resolved for `language`.
    pub async fn get_multilanguage_field(&self, language: &str) -> DbResult<Vec<Fields>> {
        const OP: &str = "get_multilanguage_field";
        self.logged(OP, async {
            let stmt = statements::select(self.descriptor, &Criteria::all(), None, None)?;
            let rows = self.run(OP, &stmt).await?.into_rows()?;
            Ok(rows
                .into_iter()
                .map(|row| localize::localize(row, language))
                .collect())
        })
        .await
    }

    async fn run(&self, operation: &str, stmt: &Statement) -> DbResult<Outcome> {
        retry_once(self.name(), operation, || {
            self.db.execute(stmt, self.descriptor)
        })
        .await
    }

    async fn logged<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = DbResult<T>>,
    ) -> DbResult<T> {
        let result = fut.await;
        if let Err(e) = &result {
            log_error(self.name(), operation, e);
        }
        result
    }
}
