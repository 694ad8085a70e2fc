//! Parameter binding utilities for database queries.
//!
//! JSON values are first checked against the field's [`FieldKind`] and turned
//! into a typed [`QueryParam`]; the backend binders then pick the matching
//! Rust type so PostgreSQL sees correctly typed parameters (a text NULL bound
//! to a UUID column is rejected by the server).

use crate::error::{DbError, DbResult};
use crate::models::{FieldDef, FieldKind};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Sqlite};
use uuid::Uuid;

/// A typed parameter value for parameterized statements.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// NULL of the given column kind
    Null(FieldKind),
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    Float(f64),
    String(String),
    Json(JsonValue),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl QueryParam {
    /// Convert a JSON value for `field` into a typed parameter.
    pub fn from_field(field: &FieldDef, value: &JsonValue) -> DbResult<Self> {
        if value.is_null() {
            return Ok(Self::Null(field.kind));
        }

        let param = match field.kind {
            FieldKind::Json => Some(Self::Json(value.clone())),
            FieldKind::Text => value.as_str().map(|s| Self::String(s.to_string())),
            FieldKind::Integer => value.as_i64().map(Self::Int),
            FieldKind::Float => value.as_f64().map(Self::Float),
            FieldKind::Boolean => value.as_bool().map(Self::Bool),
            FieldKind::Uuid => value
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(Self::Uuid),
            FieldKind::Timestamp => value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|ts| Self::Timestamp(ts.with_timezone(&Utc))),
        };

        param.ok_or_else(|| {
            DbError::invalid_input(format!(
                "Field '{}' expects a {} value, got {}",
                field.name,
                field.kind.name(),
                value
            ))
        })
    }

    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }
}

/// Append a PostgreSQL placeholder for `param` and bind its value.
pub(crate) fn push_postgres_param(builder: &mut QueryBuilder<'_, Postgres>, param: &QueryParam) {
    match param {
        QueryParam::Null(kind) => match kind {
            FieldKind::Uuid => builder.push_bind(None::<Uuid>),
            FieldKind::Text => builder.push_bind(None::<String>),
            FieldKind::Integer => builder.push_bind(None::<i64>),
            FieldKind::Float => builder.push_bind(None::<f64>),
            FieldKind::Boolean => builder.push_bind(None::<bool>),
            FieldKind::Json => builder.push_bind(None::<Json<JsonValue>>),
            FieldKind::Timestamp => builder.push_bind(None::<DateTime<Utc>>),
        },
        QueryParam::Bool(v) => builder.push_bind(*v),
        QueryParam::Int(v) => builder.push_bind(*v),
        QueryParam::Float(v) => builder.push_bind(*v),
        QueryParam::String(v) => builder.push_bind(v.clone()),
        QueryParam::Json(v) => builder.push_bind(Json(v.clone())),
        QueryParam::Uuid(v) => builder.push_bind(*v),
        QueryParam::Timestamp(v) => builder.push_bind(*v),
    };
}

/// Append a SQLite placeholder for `param` and bind its value.
pub(crate) fn push_sqlite_param(builder: &mut QueryBuilder<'_, Sqlite>, param: &QueryParam) {
    match param {
        // SQLite columns are untyped, any NULL will do
        QueryParam::Null(_) => builder.push_bind(None::<String>),
        QueryParam::Bool(v) => builder.push_bind(*v),
        QueryParam::Int(v) => builder.push_bind(*v),
        QueryParam::Float(v) => builder.push_bind(*v),
        QueryParam::String(v) => builder.push_bind(v.clone()),
        // SQLite doesn't have native JSON type, store as string
        QueryParam::Json(v) => builder.push_bind(v.to_string()),
        // Hyphenated text keeps UUID columns readable and comparable
        QueryParam::Uuid(v) => builder.push_bind(v.hyphenated().to_string()),
        QueryParam::Timestamp(v) => builder.push_bind(*v),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(kind: FieldKind) -> FieldDef {
        FieldDef::new("value", kind)
    }

    #[test]
    fn test_null_keeps_field_kind() {
        let param = QueryParam::from_field(&field(FieldKind::Uuid), &JsonValue::Null).unwrap();
        assert_eq!(param, QueryParam::Null(FieldKind::Uuid));
        assert!(param.is_null());
    }

    #[test]
    fn test_uuid_from_string() {
        let id = Uuid::new_v4();
        let param =
            QueryParam::from_field(&field(FieldKind::Uuid), &json!(id.to_string())).unwrap();
        assert_eq!(param, QueryParam::Uuid(id));
    }

    #[test]
    fn test_invalid_uuid_is_rejected() {
        let err =
            QueryParam::from_field(&field(FieldKind::Uuid), &json!("not-a-uuid")).unwrap_err();
        assert!(matches!(err, DbError::InvalidInput { .. }));
        assert!(err.to_string().contains("uuid"));
    }

    #[test]
    fn test_integer_rejects_fraction_and_text() {
        assert_eq!(
            QueryParam::from_field(&field(FieldKind::Integer), &json!(42)).unwrap(),
            QueryParam::Int(42)
        );
        assert!(QueryParam::from_field(&field(FieldKind::Integer), &json!(1.5)).is_err());
        assert!(QueryParam::from_field(&field(FieldKind::Integer), &json!("42")).is_err());
    }

    #[test]
    fn test_float_accepts_integers() {
        assert_eq!(
            QueryParam::from_field(&field(FieldKind::Float), &json!(3)).unwrap(),
            QueryParam::Float(3.0)
        );
    }

    #[test]
    fn test_json_accepts_any_value() {
        let value = json!({"en": "Music", "ru": "Музыка"});
        assert_eq!(
            QueryParam::from_field(&field(FieldKind::Json), &value).unwrap(),
            QueryParam::Json(value)
        );
    }

    #[test]
    fn test_timestamp_is_normalized_to_utc() {
        let param = QueryParam::from_field(
            &field(FieldKind::Timestamp),
            &json!("2024-05-06T15:35:41+02:00"),
        )
        .unwrap();
        match param {
            QueryParam::Timestamp(ts) => assert_eq!(ts.to_rfc3339(), "2024-05-06T13:35:41+00:00"),
            other => panic!("unexpected param: {other:?}"),
        }
    }
}
