//! Interests catalogue with per-language names.

use crate::models::{FieldDef, FieldDefault, FieldKind, Model, ModelDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

static FIELDS: [FieldDef; 4] = [
    FieldDef::new("interest_id", FieldKind::Integer)
        .primary_key()
        .default_value(FieldDefault::Identity),
    // {"en": "...", "ru": "..."}
    FieldDef::new("interest_name", FieldKind::Json),
    FieldDef::new("interest_icon_url", FieldKind::Text).nullable(),
    FieldDef::new("category", FieldKind::Json).nullable(),
];

pub static INTERESTS: ModelDescriptor = ModelDescriptor {
    table: "interests",
    fields: &FIELDS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub interest_id: i64,
    pub interest_name: JsonValue,
    pub interest_icon_url: Option<String>,
    pub category: Option<JsonValue>,
}

impl Model for Interest {
    fn descriptor() -> &'static ModelDescriptor {
        &INTERESTS
    }
}
