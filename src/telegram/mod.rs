//! Telegram bot integration: dialogs, handlers, and the webhook server

pub mod bot;
pub mod dialog;
pub mod handlers;
pub mod keyboards;
pub mod notifications;
pub mod webhook;

// Re-exports for convenience
pub use bot::{create_bot, Command};
pub use dialog::{Flow, SessionStore};
pub use handlers::{schema, HandlerDeps, HandlerError};
