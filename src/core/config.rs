use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Publicly reachable webhook URL registered with Telegram at startup
/// Read from WEBHOOK_URL environment variable
/// Example: https://my-app.example.com/webhook
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| env::var("WEBHOOK_URL").ok());

/// Port the webhook HTTP server listens on
/// Read from PORT environment variable
/// Default: 8000
pub static PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000)
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: database.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "database.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    /// Telegram user ID seeded into the admins table at startup.
    /// Read from ADMIN_USER_ID (ADMIN_ID accepted as a fallback).
    /// Defaults to 0 if not set (nobody passes the admin check).
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_USER_ID")
            .or_else(|_| env::var("ADMIN_ID"))
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0)
    });
}

/// Outbound network configuration
pub mod network {
    use super::Duration;

    /// Timeout for outbound Telegram API requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Conversation session configuration
pub mod session {
    use super::Duration;

    /// Idle lifetime of an abandoned multi-step dialog (in seconds).
    /// Expired sessions are evicted lazily on the user's next message.
    pub const TTL_SECS: u64 = 30 * 60;

    /// Session time-to-live duration
    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }
}

/// Webhook ingress configuration
pub mod webhook {
    use super::Duration;

    /// Bound on queued updates awaiting the dispatch worker
    pub const UPDATE_QUEUE_CAPACITY: usize = 64;

    /// How long an HTTP request waits for its update to be processed (in seconds)
    pub const PROCESS_TIMEOUT_SECS: u64 = 30;

    /// Update processing timeout duration
    pub fn process_timeout() -> Duration {
        Duration::from_secs(PROCESS_TIMEOUT_SECS)
    }
}
