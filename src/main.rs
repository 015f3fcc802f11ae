use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use videohub_bot::core::{config, init_logger};
use videohub_bot::storage::{create_pool, db, get_connection};
use videohub_bot::telegram::webhook::{run_webhook_server, spawn_update_worker, WebhookState};
use videohub_bot::telegram::{create_bot, schema, HandlerDeps, SessionStore};

/// Main entry point for the bot.
///
/// Startup order matters: schema creation and webhook registration failures
/// abort the process; everything after that degrades per-request instead.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    log::info!("Starting bot in webhook mode...");

    // Create database connection pool; runs idempotent schema creation
    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);

    // Seed the configured admin. Membership itself is always checked against
    // the admins table, so further admins can be added out-of-band.
    let admin_id = *config::admin::ADMIN_USER_ID;
    if admin_id != 0 {
        let conn = get_connection(&db_pool)?;
        db::add_admin(&conn, admin_id)?;
        log::info!("Seeded admin {}", admin_id);
    } else {
        log::warn!("ADMIN_USER_ID is not set; admin actions will be denied for everyone");
    }

    let bot = create_bot()?;

    // Command parsing needs the bot's own profile (for /cmd@botname mentions)
    let me = bot.get_me().await?;
    log::info!("Authorized as @{}", me.username());

    // Build the dispatcher tree once and hand it to the dedicated worker
    let sessions = Arc::new(SessionStore::new());
    let deps = HandlerDeps::new(Arc::clone(&db_pool), Arc::clone(&sessions));
    let handler = schema(deps);
    let queue = spawn_update_worker(bot.clone(), me, handler);

    // Register the public webhook URL with Telegram
    let webhook_url = config::WEBHOOK_URL
        .clone()
        .ok_or_else(|| anyhow::anyhow!("WEBHOOK_URL environment variable is not set"))?;
    let url = url::Url::parse(&webhook_url)?;

    // Delete any existing webhook to ensure clean state
    let _ = bot.delete_webhook().await;
    bot.set_webhook(url).await?;
    log::info!("Webhook set to {}", webhook_url);

    // Serve until ctrl_c
    run_webhook_server(*config::PORT, WebhookState::new(queue)).await?;

    log::info!("Shutting down, removing webhook...");
    if let Err(e) = bot.delete_webhook().await {
        log::error!("Failed to remove webhook: {}", e);
    }

    Ok(())
}
