//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::storage::db::DbPool;
use crate::storage::get_connection;
use crate::storage::DbConnection;
use crate::telegram::dialog::SessionStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for handlers
pub type HandlerResult = Result<(), HandlerError>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub sessions: Arc<SessionStore>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, sessions: Arc<SessionStore>) -> Self {
        Self { db_pool, sessions }
    }

    /// Pooled connection, with the store error logged and swallowed.
    ///
    /// Handlers treat an unreachable store as an empty read / no-op write, so
    /// a flow never aborts on infrastructure failure.
    pub fn connection(&self) -> Option<DbConnection> {
        match get_connection(&self.db_pool) {
            Ok(conn) => Some(conn),
            Err(e) => {
                log::error!("Failed to get DB connection: {}", e);
                None
            }
        }
    }
}

/// Telegram ID of the message sender, if present.
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(|user| i64::try_from(user.id.0).ok())
}

/// True for `/`-prefixed text; commands never feed an open dialog.
pub fn is_command(msg: &Message) -> bool {
    msg.text().map(|text| text.starts_with('/')).unwrap_or(false)
}
