//! Per-call failure handling: one retry on a lost connection, then logging.
//!
//! Every DAO operation funnels its statement through [`retry_once`] and its
//! final error through [`log_error`], tagged with the table and the
//! operation name.

use crate::error::{DbError, DbResult};
use std::future::Future;
use tracing::{error, warn};

/// Run `attempt`, and run it exactly once more if the first try failed with a
/// transient connection error. Each attempt acquires its own connection.
pub async fn retry_once<T, F, Fut>(table: &str, operation: &str, mut attempt: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    match attempt().await {
        Err(e) if e.is_transient() => {
            warn!(
                table,
                operation,
                error = %e,
                "Connection lost, retrying on a fresh connection"
            );
            attempt().await
        }
        other => other,
    }
}

/// Log a failed operation.
pub fn log_error(table: &str, operation: &str, err: &DbError) {
    let kind = if err.is_store_error() {
        "Database error"
    } else {
        "Unknown error"
    };
    error!(
        table,
        operation,
        error = %err,
        code = err.code(),
        "{kind}: cannot {operation} data in table"
    );
}
