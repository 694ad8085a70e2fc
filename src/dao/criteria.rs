//! Equality filters.

use crate::models::Fields;
use serde_json::Value as JsonValue;

/// Field name to expected value. Every entry must match (`AND`); a null value
/// matches `IS NULL`. An empty criteria matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria(Fields);

impl Criteria {
    /// Match every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition, replacing any previous one on `field`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }
}

impl From<Fields> for Criteria {
    fn from(fields: Fields) -> Self {
        Self(fields)
    }
}
