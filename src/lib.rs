//! DAO backend library.
//!
//! A web API backend template built around a generic data access object
//! layer over PostgreSQL and SQLite: every operation runs on its own pooled
//! connection, retries once after a lost connection and reports failures as
//! categorized errors.

pub mod api;
pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod setup;

pub use config::Config;
pub use dao::{Criteria, Dao};
pub use db::Database;
pub use error::{DbError, DbResult, DbResultExt};
