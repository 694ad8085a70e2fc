//! Data models for the DAO backend.
//!
//! This module holds the descriptor vocabulary and every entity known to the
//! application.

pub mod descriptor;
pub mod interest;
pub mod test_model;

use serde_json::Value as JsonValue;

// Re-export commonly used types
pub use descriptor::{FieldDef, FieldDefault, FieldKind, Model, ModelDescriptor};
pub use interest::{INTERESTS, Interest};
pub use test_model::{NewTestModel, TEST_MODELS, TestModel};

/// Field name to value mapping, used for record values, patches and filters.
pub type Fields = serde_json::Map<String, JsonValue>;

/// Every descriptor managed by the schema commands, in creation order.
pub fn registry() -> &'static [&'static ModelDescriptor] {
    static REGISTRY: [&ModelDescriptor; 2] = [&TEST_MODELS, &INTERESTS];
    &REGISTRY
}
