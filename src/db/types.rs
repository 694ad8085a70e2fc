//! Row decoding driven by table descriptors.
//!
//! Rows are decoded column by column into a JSON object, using each field's
//! [`FieldKind`] to pick the Rust type to read. The resulting object is what
//! the DAO deserializes into a model.

use crate::error::DbResult;
use crate::models::{FieldDef, FieldKind, Fields, ModelDescriptor};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_fields(&self, descriptor: &ModelDescriptor) -> DbResult<Fields>;
}

impl RowToJson for PgRow {
    fn to_fields(&self, descriptor: &ModelDescriptor) -> DbResult<Fields> {
        descriptor
            .fields
            .iter()
            .map(|field| postgres::decode_field(self, field).map(|v| (field.name.to_string(), v)))
            .collect()
    }
}

impl RowToJson for SqliteRow {
    fn to_fields(&self, descriptor: &ModelDescriptor) -> DbResult<Fields> {
        descriptor
            .fields
            .iter()
            .map(|field| sqlite::decode_field(self, field).map(|v| (field.name.to_string(), v)))
            .collect()
    }
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn timestamp_value(ts: DateTime<Utc>) -> JsonValue {
    JsonValue::String(ts.to_rfc3339())
}

fn or_null<T>(value: Option<T>, f: impl FnOnce(T) -> JsonValue) -> JsonValue {
    value.map(f).unwrap_or(JsonValue::Null)
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod postgres {
    use super::*;

    pub fn decode_field(row: &PgRow, field: &FieldDef) -> DbResult<JsonValue> {
        let name = field.name;
        let value = match field.kind {
            FieldKind::Uuid => or_null(row.try_get::<Option<Uuid>, _>(name)?, |v| {
                JsonValue::String(v.to_string())
            }),
            FieldKind::Text => or_null(row.try_get::<Option<String>, _>(name)?, JsonValue::String),
            FieldKind::Integer => decode_integer(row, name)?,
            FieldKind::Float => or_null(row.try_get::<Option<f64>, _>(name)?, float_value),
            FieldKind::Boolean => or_null(row.try_get::<Option<bool>, _>(name)?, JsonValue::Bool),
            FieldKind::Json => row
                .try_get::<Option<JsonValue>, _>(name)?
                .unwrap_or(JsonValue::Null),
            FieldKind::Timestamp => {
                or_null(row.try_get::<Option<DateTime<Utc>>, _>(name)?, timestamp_value)
            }
        };
        Ok(value)
    }

    /// BIGINT is what our DDL creates, but accept narrower columns from
    /// hand-written schemas too.
    fn decode_integer(row: &PgRow, name: &str) -> DbResult<JsonValue> {
        if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
            return Ok(or_null(v, |v| JsonValue::Number(v.into())));
        }
        if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
            return Ok(or_null(v, |v| JsonValue::Number(v.into())));
        }
        let v = row.try_get::<Option<i64>, _>(name)?;
        Ok(or_null(v, |v| JsonValue::Number(v.into())))
    }
}

mod sqlite {
    use super::*;

    pub fn decode_field(row: &SqliteRow, field: &FieldDef) -> DbResult<JsonValue> {
        let name = field.name;
        let value = match field.kind {
            // UUIDs are stored as hyphenated text
            FieldKind::Uuid | FieldKind::Text => {
                or_null(row.try_get::<Option<String>, _>(name)?, JsonValue::String)
            }
            FieldKind::Integer => or_null(row.try_get::<Option<i64>, _>(name)?, |v| {
                JsonValue::Number(v.into())
            }),
            FieldKind::Float => or_null(row.try_get::<Option<f64>, _>(name)?, float_value),
            FieldKind::Boolean => or_null(row.try_get::<Option<bool>, _>(name)?, JsonValue::Bool),
            FieldKind::Json => or_null(row.try_get::<Option<String>, _>(name)?, |v| {
                serde_json::from_str::<JsonValue>(&v).unwrap_or(JsonValue::String(v))
            }),
            FieldKind::Timestamp => {
                or_null(row.try_get::<Option<DateTime<Utc>>, _>(name)?, timestamp_value)
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_value() {
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
        assert_eq!(float_value(f64::NAN), JsonValue::String("NaN".to_string()));
    }

    #[test]
    fn test_timestamp_value_is_rfc3339() {
        let ts = DateTime::parse_from_rfc3339("2024-05-06T13:35:41Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            timestamp_value(ts),
            JsonValue::String("2024-05-06T13:35:41+00:00".to_string())
        );
    }

    #[test]
    fn test_or_null() {
        assert_eq!(or_null(None::<bool>, JsonValue::Bool), JsonValue::Null);
        assert_eq!(or_null(Some(true), JsonValue::Bool), JsonValue::Bool(true));
    }
}
