//! Statement builders for the DAO operations.
//!
//! Every field name coming from a caller is checked against the descriptor
//! before it reaches SQL, and every value is converted to a typed
//! [`QueryParam`] for its field.

use crate::dao::Criteria;
use crate::db::{Expect, QueryParam, Statement};
use crate::error::{DbError, DbResult};
use crate::models::{FieldDefault, Fields, ModelDescriptor};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A page window for `get_paginated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(offset: u64, limit: u64) -> DbResult<Self> {
        if limit == 0 {
            return Err(DbError::invalid_input("Page limit must be greater than zero"));
        }
        Ok(Self { offset, limit })
    }
}

fn to_i64(value: u64, what: &str) -> DbResult<i64> {
    i64::try_from(value).map_err(|_| DbError::invalid_input(format!("{} is too large", what)))
}

fn push_where(
    sql: &mut Statement,
    descriptor: &ModelDescriptor,
    criteria: &Criteria,
) -> DbResult<()> {
    for (i, (name, value)) in criteria.iter().enumerate() {
        let field = descriptor.require_field(name)?;
        sql.push(if i == 0 { " WHERE " } else { " AND " });
        sql.push_eq(field.name, QueryParam::from_field(field, value)?);
    }
    Ok(())
}

/// `SELECT` every column of the rows matching `criteria`.
///
/// `stream_limit` caps how many rows are read back; a `page` adds a stable
/// ordering on the primary key and `LIMIT`/`OFFSET`.
pub fn select(
    descriptor: &ModelDescriptor,
    criteria: &Criteria,
    page: Option<Page>,
    stream_limit: Option<usize>,
) -> DbResult<Statement> {
    let mut sql = Statement::new(Expect::Rows { limit: stream_limit }, false);
    sql.push("SELECT ")
        .push_idents(descriptor.column_names())
        .push(" FROM ")
        .push_ident(descriptor.table);
    push_where(&mut sql, descriptor, criteria)?;

    if let Some(page) = page {
        let order: Vec<&str> = descriptor.primary_key().map(|f| f.name).collect();
        if !order.is_empty() {
            sql.push(" ORDER BY ").push_idents(order);
        }
        sql.push(" LIMIT ")
            .push_bind(QueryParam::Int(to_i64(page.limit, "Page limit")?))
            .push(" OFFSET ")
            .push_bind(QueryParam::Int(to_i64(page.offset, "Page offset")?));
    }

    Ok(sql)
}

/// `INSERT ... RETURNING` for one record.
///
/// Absent fields with a generated UUID default get a fresh v4 value; absent
/// identity and nullable fields are left to the store.
pub fn insert(descriptor: &ModelDescriptor, values: &Fields) -> DbResult<Statement> {
    for name in values.keys() {
        descriptor.require_field(name)?;
    }

    let mut columns = Vec::new();
    let mut params = Vec::new();
    for field in descriptor.fields {
        let value = values.get(field.name).filter(|v| !v.is_null());
        match (value, field.default) {
            (Some(value), _) => {
                columns.push(field.name);
                params.push(QueryParam::from_field(field, value)?);
            }
            (None, Some(FieldDefault::NewUuid)) => {
                columns.push(field.name);
                params.push(QueryParam::Uuid(Uuid::new_v4()));
            }
            (None, Some(FieldDefault::Identity)) => {}
            (None, None) if field.nullable => {}
            (None, None) => {
                return Err(DbError::invalid_input(format!(
                    "Missing required field '{}'",
                    field.name
                )));
            }
        }
    }

    let mut sql = Statement::new(Expect::Rows { limit: None }, true);
    sql.push("INSERT INTO ").push_ident(descriptor.table);
    if columns.is_empty() {
        sql.push(" DEFAULT VALUES");
    } else {
        sql.push(" (").push_idents(columns).push(") VALUES (");
        for (i, param) in params.into_iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push_bind(param);
        }
        sql.push(")");
    }
    sql.push(" RETURNING ").push_idents(descriptor.column_names());

    Ok(sql)
}

/// Single `UPDATE ... RETURNING` of the rows whose `id_field` equals `id_value`.
pub fn update(
    descriptor: &ModelDescriptor,
    id_field: &str,
    id_value: &JsonValue,
    patch: &Fields,
) -> DbResult<Statement> {
    if patch.is_empty() {
        return Err(DbError::invalid_input("Update patch is empty"));
    }
    let id = descriptor.require_field(id_field)?;

    let mut sql = Statement::new(Expect::Rows { limit: None }, true);
    sql.push("UPDATE ").push_ident(descriptor.table).push(" SET ");
    for (i, (name, value)) in patch.iter().enumerate() {
        let field = descriptor.require_field(name)?;
        if value.is_null() && !field.nullable {
            return Err(DbError::invalid_input(format!(
                "Field '{}' cannot be null",
                field.name
            )));
        }
        if i > 0 {
            sql.push(", ");
        }
        sql.push_ident(field.name)
            .push(" = ")
            .push_bind(QueryParam::from_field(field, value)?);
    }
    sql.push(" WHERE ")
        .push_eq(id.name, QueryParam::from_field(id, id_value)?)
        .push(" RETURNING ")
        .push_idents(descriptor.column_names());

    Ok(sql)
}

/// `DELETE` the rows whose `id_field` equals `id_value`.
pub fn delete(
    descriptor: &ModelDescriptor,
    id_field: &str,
    id_value: &JsonValue,
) -> DbResult<Statement> {
    let id = descriptor.require_field(id_field)?;

    let mut sql = Statement::new(Expect::RowsAffected, true);
    sql.push("DELETE FROM ")
        .push_ident(descriptor.table)
        .push(" WHERE ")
        .push_eq(id.name, QueryParam::from_field(id, id_value)?);

    Ok(sql)
}
