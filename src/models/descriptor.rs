//! Declarative table descriptors.
//!
//! A [`ModelDescriptor`] is the static description of one storage entity: its
//! table name and typed fields. The DAO layer only reads descriptors; it uses
//! them to validate filter and value keys, to pick bind types and to decode
//! rows.

use crate::error::{DbError, DbResult};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Logical column type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Uuid,
    Text,
    /// 64-bit signed integer
    Integer,
    Float,
    Boolean,
    /// JSON document (JSONB on PostgreSQL, JSON text on SQLite)
    Json,
    /// UTC timestamp
    Timestamp,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::Timestamp => "timestamp",
        }
    }
}

/// How a field gets its value when `create` does not supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// A random UUID v4 generated before the insert.
    NewUuid,
    /// Assigned by the store (identity / autoincrement column).
    Identity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub primary_key: bool,
    pub nullable: bool,
    pub default: Option<FieldDefault>,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            primary_key: false,
            nullable: false,
            default: None,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn default_value(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// Static description of one table.
#[derive(Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub table: &'static str,
    pub fields: &'static [FieldDef],
}

impl ModelDescriptor {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by name, failing with a schema error for unknown names.
    pub fn require_field(&self, name: &str) -> DbResult<&FieldDef> {
        self.field(name).ok_or_else(|| {
            DbError::schema(
                format!("Unknown field '{}'", name),
                format!("{}.{}", self.table, name),
            )
        })
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// A record type bound to one table.
///
/// Records cross the DAO boundary through serde: values are serialized to a
/// JSON object before binding and rows are decoded into a JSON object before
/// being deserialized into `Self`.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    fn descriptor() -> &'static ModelDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: [FieldDef; 3] = [
        FieldDef::new("id", FieldKind::Integer)
            .primary_key()
            .default_value(FieldDefault::Identity),
        FieldDef::new("name", FieldKind::Text),
        FieldDef::new("note", FieldKind::Text).nullable(),
    ];

    static NOTES: ModelDescriptor = ModelDescriptor {
        table: "notes",
        fields: &FIELDS,
    };

    #[test]
    fn test_field_lookup() {
        assert_eq!(NOTES.field("name").map(|f| f.kind), Some(FieldKind::Text));
        assert!(NOTES.field("missing").is_none());
    }

    #[test]
    fn test_require_field_reports_table_and_field() {
        let err = NOTES.require_field("missing").unwrap_err();
        match err {
            DbError::Schema { object, .. } => assert_eq!(object, "notes.missing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_primary_key() {
        let pk: Vec<_> = NOTES.primary_key().map(|f| f.name).collect();
        assert_eq!(pk, vec!["id"]);
    }

    #[test]
    fn test_column_names_in_declaration_order() {
        let cols: Vec<_> = NOTES.column_names().collect();
        assert_eq!(cols, vec!["id", "name", "note"]);
    }
}
