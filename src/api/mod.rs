//! HTTP API.
//!
//! Routes live under `/api/v1`. Handlers return [`DbResult`](crate::error::DbResult)
//! so store failures turn into JSON error responses with a status picked by
//! error category.

pub mod interests;
pub mod test_routes;

use crate::config::Config;
use crate::dao::Dao;
use crate::db::Database;
use crate::models::{Interest, TestModel};
use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub test_models: Dao<TestModel>,
    pub interests: Dao<Interest>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            test_models: Dao::new(db.clone()),
            interests: Dao::new(db),
        }
    }
}

/// All API routes, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(test_routes::router())
                .merge(interests::router()),
        )
        .with_state(state)
}

/// The full application: routes plus CORS and request logging.
pub fn app(state: AppState, config: &Config) -> Router {
    router(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::OPTIONS,
    Method::DELETE,
    Method::PATCH,
    Method::PUT,
];

const ALLOWED_HEADERS: [HeaderName; 5] = [
    header::CONTENT_TYPE,
    header::SET_COOKIE,
    header::ACCESS_CONTROL_ALLOW_HEADERS,
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    header::AUTHORIZATION,
];

/// CORS policy for the configured origins.
///
/// Credentials are only allowed with an explicit origin list; browsers reject
/// them alongside a wildcard origin.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS);

    if config.cors_allows_any() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins).allow_credentials(true)
}
