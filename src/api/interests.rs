use super::AppState;
use crate::dao::DEFAULT_LANGUAGE;
use crate::error::DbResult;
use crate::models::Fields;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new().route("/interests", get(list_interests))
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    #[serde(default = "default_language")]
    pub lang: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Every interest with its names resolved for `?lang=`.
async fn list_interests(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> DbResult<Json<Vec<Fields>>> {
    let interests = state.interests.get_multilanguage_field(&query.lang).await?;
    Ok(Json(interests))
}
