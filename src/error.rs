//! Error types for the DAO backend.
//!
//! This module defines all error types using `thiserror`. Every variant maps to
//! one failure category so callers can tell "no data" apart from "the
//! operation failed", and the HTTP layer can pick a status code.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "23505" for unique violation
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String, suggestion: String },

    #[error("Schema error: {message} (object: {object})")]
    Schema { message: String, object: String },

    #[error("Timeout: {operation} exceeded its configured limit")]
    Timeout { operation: String },

    #[error("Expected at most one row in '{table}', found several")]
    MultipleRows { table: String },

    #[error("Record not found in '{table}'")]
    NotFound { table: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    pub fn configuration(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            object: object.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn multiple_rows(table: impl Into<String>) -> Self {
        Self::MultipleRows {
            table: table.into(),
        }
    }

    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            Self::Configuration { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// A stale or invalid connection handle. Recoverable by acquiring a fresh
    /// connection, so the DAO retries these exactly once.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Whether the error was raised by the store or the driver, as opposed to
    /// input validation or decoding on our side.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::Database { .. }
                | Self::Timeout { .. }
                | Self::MultipleRows { .. }
        )
    }

    /// Machine-readable error code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection_failed",
            Self::Database { .. } => "database_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Schema { .. } => "schema_error",
            Self::Timeout { .. } => "timeout",
            Self::MultipleRows { .. } => "multiple_rows",
            Self::NotFound { .. } => "not_found",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// HTTP status for this error category.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } | Self::Schema { .. } | Self::Database { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MultipleRows { .. } => StatusCode::CONFLICT,
            Self::Connection { .. } | Self::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Configuration { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// SQLSTATEs meaning the server dropped or refused the session: class 08
/// (connection exception) plus admin/crash shutdown and "cannot connect now".
fn is_connection_state(code: &str) -> bool {
    code.starts_with("08") || matches!(code, "57P01" | "57P02" | "57P03")
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::configuration(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                match code {
                    Some(state) if is_connection_state(&state) => DbError::connection(
                        format!("{} (SQLSTATE {})", db_err.message(), state),
                        "The server closed the session; a fresh connection will be acquired",
                    ),
                    code => DbError::database(
                        db_err.message(),
                        code,
                        "Check the submitted values against the table constraints",
                    ),
                }
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the filter matches existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::timeout("connection pool acquire"),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::WorkerCrashed => DbError::connection(
                "Database worker crashed",
                "The connection was dropped; a fresh one will be acquired",
            ),
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::TypeNotFound { type_name } => DbError::schema(
                format!("Type not found: {}", type_name),
                type_name.to_string(),
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::schema(format!("Column not found: {}", col), col.to_string())
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::internal(format!("Failed to map record: {}", err))
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Opt-in conversion back to the "empty result on failure" behaviour.
///
/// The DAO has already logged the failure with its table and operation, so
/// this only discards the error.
pub trait DbResultExt<T> {
    /// Replace any error with `T::default()` (`None`, an empty vec, `false`).
    fn suppress(self) -> T
    where
        T: Default;
}

impl<T> DbResultExt<T> for DbResult<T> {
    fn suppress(self) -> T
    where
        T: Default,
    {
        self.unwrap_or_default()
    }
}

/// Request extraction failures share the JSON error body.
macro_rules! impl_from_rejection {
    ($($rejection:ty),* $(,)?) => {
        $(
            impl From<$rejection> for DbError {
                fn from(rejection: $rejection) -> Self {
                    DbError::invalid_input(rejection.body_text())
                }
            }
        )*
    };
}

impl_from_rejection!(PathRejection, QueryRejection, JsonRejection);

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

impl IntoResponse for DbError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
                suggestion: self.suggestion(),
            },
        };
        (status, Json(body)).into_response()
    }
}
