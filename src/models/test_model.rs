//! Placeholder entity backing the `/api/v1/test` endpoints.

use crate::models::{FieldDef, FieldDefault, FieldKind, Model, ModelDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

static FIELDS: [FieldDef; 2] = [
    FieldDef::new("test_id", FieldKind::Uuid)
        .primary_key()
        .default_value(FieldDefault::NewUuid),
    FieldDef::new("info", FieldKind::Text),
];

pub static TEST_MODELS: ModelDescriptor = ModelDescriptor {
    table: "test-models",
    fields: &FIELDS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestModel {
    pub test_id: Uuid,
    pub info: String,
}

impl Model for TestModel {
    fn descriptor() -> &'static ModelDescriptor {
        &TEST_MODELS
    }
}

impl fmt::Display for TestModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test: {}", self.test_id)
    }
}

/// Request body for creating a [`TestModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTestModel {
    pub info: String,
}
