//! videohub-bot — webhook-driven Telegram bot for user registration and
//! video announcements.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, and logging
//! - `storage`: database pool, schema, and CRUD accessors
//! - `telegram`: bot construction, conversation dialogs, handlers, and the
//!   webhook HTTP server

pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{schema, HandlerDeps, SessionStore};
