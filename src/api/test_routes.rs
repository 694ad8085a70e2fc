//! `/test` placeholder endpoints and CRUD over `test-models`.

use super::AppState;
use crate::dao::Criteria;
use crate::error::{DbError, DbResult};
use crate::models::{NewTestModel, TEST_MODELS, TestModel};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: u64 = 50;

const ID_FIELD: &str = "test_id";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test", get(test_endpoint).post(create_test_model))
        .route("/test/models", get(list_test_models))
        .route(
            "/test/models/{id}",
            get(get_test_model)
                .patch(update_test_model)
                .delete(delete_test_model),
        )
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TestModelPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

async fn test_endpoint() -> Json<JsonValue> {
    Json(json!({ "response": "test success" }))
}

async fn create_test_model(
    State(state): State<AppState>,
    body: Result<Json<NewTestModel>, JsonRejection>,
) -> DbResult<(StatusCode, Json<TestModel>)> {
    let Json(body) = body?;
    let model = state.test_models.create(&body).await?;
    info!(%model, "Created test model");
    Ok((StatusCode::CREATED, Json(model)))
}

async fn list_test_models(
    State(state): State<AppState>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> DbResult<Json<Vec<TestModel>>> {
    let Query(page) = page?;
    let models = state
        .test_models
        .get_paginated(page.offset, page.limit, &Criteria::all())
        .await?;
    Ok(Json(models))
}

async fn get_test_model(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> DbResult<Json<TestModel>> {
    let Path(id) = id?;
    state
        .test_models
        .find_one_or_none(&Criteria::new().eq(ID_FIELD, id.to_string()))
        .await?
        .map(Json)
        .ok_or_else(|| DbError::not_found(TEST_MODELS.table))
}

async fn update_test_model(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    patch: Result<Json<TestModelPatch>, JsonRejection>,
) -> DbResult<Json<TestModel>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    state
        .test_models
        .update_by_id(ID_FIELD, id.to_string(), &patch)
        .await?
        .map(Json)
        .ok_or_else(|| DbError::not_found(TEST_MODELS.table))
}

async fn delete_test_model(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> DbResult<StatusCode> {
    let Path(id) = id?;
    if state.test_models.delete_by_id(ID_FIELD, id.to_string()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DbError::not_found(TEST_MODELS.table))
    }
}
