//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection pool management
//! - Statement building and execution
//! - Descriptor-driven parameter binding and row decoding
//! - Schema DDL
//! - Database dispatch macros for reducing code duplication

pub mod executor;
#[macro_use]
pub mod macros;
pub mod params;
pub mod pool;
pub mod schema;
pub mod sql;
pub mod types;

pub use executor::{Outcome, render_sql};
pub use macros::DatabaseType;
pub use params::QueryParam;
pub use pool::{Database, DbPool};
pub use sql::{Expect, Fragment, Statement};
