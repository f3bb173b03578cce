//! Client contact store.
//!
//! Two tables, `clients` and their `phones`, with create, update, delete and
//! lookup operations. PostgreSQL is the production backend; the same SQL
//! runs on SQLite, which the tests use.

pub mod cli;
pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod models;

pub use db::Database;
pub use error::{Result, StoreError};
