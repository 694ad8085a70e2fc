//! Generic data access objects.
//!
//! A [`Dao<M>`] is bound to one [`Model`] at construction and exposes the
//! uniform CRUD surface for it. Every operation:
//!
//! - acquires its own pooled connection and releases it on every exit path
//! - runs exactly one statement; mutating statements commit on success and
//!   roll back otherwise
//! - retries once on a freshly acquired connection after a transient
//!   connection failure
//! - logs failures with the table and operation name, then returns them as a
//!   categorized [`DbError`]
//!
//! Absence is never an error: a miss is `Ok(None)`, an empty vec or `false`.
//! Callers wanting the old empty-on-error behaviour can use
//! [`DbResultExt::suppress`](crate::error::DbResultExt::suppress).
//!
//! # Example
//!
//! ```ignore
//! let dao = Dao::<TestModel>::new(db.clone());
//! let created = dao.create(&NewTestModel { info: "hello".into() }).await?;
//! let found = dao
//!     .find_one_or_none(&Criteria::new().eq("test_id", created.test_id.to_string()))
//!     .await?;
//! ```

pub mod criteria;
pub mod localize;
pub mod seed;
pub mod statements;
pub mod table;
pub mod transaction;

pub use criteria::Criteria;
pub use localize::DEFAULT_LANGUAGE;
pub use table::Table;

use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::models::{Fields, Model};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use transaction::log_error;

pub struct Dao<M: Model> {
    table: Table,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for Dao<M> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Dao<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dao")
            .field("table", &self.table.name())
            .finish()
    }
}

impl<M: Model> Dao<M> {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            table: Table::new(db, M::descriptor()),
            _model: PhantomData,
        }
    }

    pub async fn find_one_or_none(&self, criteria: &Criteria) -> DbResult<Option<M>> {
        self.table
            .find_one_or_none(criteria)
            .await?
            .map(|row| self.decode("find_one_or_none", row))
            .transpose()
    }

    pub async fn find_all(&self, criteria: &Criteria) -> DbResult<Vec<M>> {
        let rows = self.table.find_all(criteria).await?;
        self.decode_all("find_all", rows)
    }

    pub async fn get_paginated(
        &self,
        offset: u64,
        limit: u64,
        criteria: &Criteria,
    ) -> DbResult<Vec<M>> {
        let rows = self.table.get_paginated(offset, limit, criteria).await?;
        self.decode_all("get_paginated", rows)
    }

    /// Insert a record built from `values`, any serializable object whose
    /// keys are field names, and return it with generated values populated.
    pub async fn create<V: Serialize + ?Sized>(&self, values: &V) -> DbResult<M> {
        let values = self.encode("create", values)?;
        let row = self.table.create(&values).await?;
        self.decode("create", row)
    }

    /// Apply `patch` to the record whose `id_field` equals `id_value`.
    pub async fn update_by_id<P: Serialize + ?Sized>(
        &self,
        id_field: &str,
        id_value: impl Into<JsonValue>,
        patch: &P,
    ) -> DbResult<Option<M>> {
        let patch = self.encode("update_by_id", patch)?;
        self.table
            .update_by_id(id_field, &id_value.into(), &patch)
            .await?
            .map(|row| self.decode("update_by_id", row))
            .transpose()
    }

    pub async fn delete_by_id(
        &self,
        id_field: &str,
        id_value: impl Into<JsonValue>,
    ) -> DbResult<bool> {
        self.table.delete_by_id(id_field, &id_value.into()).await
    }

    /// Every record as a JSON object, multilanguage fields resolved for
    /// `language` with a fallback to [`DEFAULT_LANGUAGE`].
    pub async fn get_multilanguage_field(&self, language: &str) -> DbResult<Vec<Fields>> {
        self.table.get_multilanguage_field(language).await
    }

    fn encode<V: Serialize + ?Sized>(&self, operation: &str, values: &V) -> DbResult<Fields> {
        let result = match serde_json::to_value(values) {
            Ok(JsonValue::Object(fields)) => Ok(fields),
            Ok(other) => Err(DbError::invalid_input(format!(
                "Expected an object of field values, got {}",
                other
            ))),
            Err(e) => Err(DbError::invalid_input(e.to_string())),
        };
        if let Err(e) = &result {
            log_error(self.table.name(), operation, e);
        }
        result
    }

    fn decode(&self, operation: &str, row: Fields) -> DbResult<M> {
        serde_json::from_value(JsonValue::Object(row)).map_err(|e| {
            let err = DbError::from(e);
            log_error(self.table.name(), operation, &err);
            err
        })
    }

    fn decode_all(&self, operation: &str, rows: Vec<Fields>) -> DbResult<Vec<M>> {
        rows.into_iter()
            .map(|row| self.decode(operation, row))
            .collect()
    }
}
