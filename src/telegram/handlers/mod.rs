//! Update handlers and the dispatcher schema

pub mod admin;
pub mod registration;
pub mod schema;
pub mod types;
pub mod videos;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, HandlerResult};
