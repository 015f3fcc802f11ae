//! Database pool, schema, and CRUD accessors

pub mod db;

pub use db::{create_pool, get_connection, DbConnection, DbPool};
