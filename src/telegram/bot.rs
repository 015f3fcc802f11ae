//! Bot instance creation and the command enum

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::core::AppError;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "register or open the video menu")]
    Start,
    #[command(description = "admin panel (admins only)")]
    Admin,
}

/// Creates a Bot instance from the configured token.
///
/// The underlying reqwest client carries an explicit request timeout so a
/// stuck Telegram call cannot hold the dispatch worker forever.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(AppError)` - Token missing or HTTP client construction failed
pub fn create_bot() -> Result<Bot, AppError> {
    if config::BOT_TOKEN.is_empty() {
        return Err(AppError::Config(
            "BOT_TOKEN environment variable is not set".to_string(),
        ));
    }

    let client = ClientBuilder::new()
        .timeout(config::network::timeout())
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Bot::with_client(config::BOT_TOKEN.as_str(), client))
}
