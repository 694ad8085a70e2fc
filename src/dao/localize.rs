//! Multilanguage field resolution.

use crate::models::Fields;
use serde_json::Value as JsonValue;

/// Language used when a record has no value for the requested one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Replace every object-valued field of `row` by its entry for `language`,
/// falling back to [`DEFAULT_LANGUAGE`], else null. Other values are kept.
pub fn localize(row: Fields, language: &str) -> Fields {
    row.into_iter()
        .map(|(name, value)| match value {
            JsonValue::Object(translations) => {
                let resolved = translations
                    .get(language)
                    .or_else(|| translations.get(DEFAULT_LANGUAGE))
                    .cloned()
                    .unwrap_or(JsonValue::Null);
                (name, resolved)
            }
            other => (name, other),
        })
        .collect()
}
