//! Best-effort broadcast to all registered users

use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::storage::db;
use crate::telegram::handlers::HandlerDeps;

/// Notify every registered user about a freshly published video.
///
/// Sends are issued one at a time; a failed recipient (blocked bot, stale
/// id, network hiccup) is logged and skipped. No retry, no delivery
/// confirmation, and the video row is never rolled back.
pub async fn broadcast_new_video(bot: &Bot, deps: &HandlerDeps, youtube_link: &str) {
    let users = deps
        .connection()
        .map(|conn| {
            db::get_all_users(&conn).unwrap_or_else(|e| {
                log::error!("Failed to list users for broadcast: {}", e);
                Vec::new()
            })
        })
        .unwrap_or_default();

    let text = format!("New video just released!\n{}", youtube_link);
    let total = users.len();
    let mut delivered = 0usize;

    for user in users {
        match bot.send_message(ChatId(user.telegram_id), &text).await {
            Ok(_) => delivered += 1,
            Err(e) => log::warn!("Failed to notify user {}: {}", user.telegram_id, e),
        }
    }

    log::info!("Broadcast delivered to {}/{} users", delivered, total);
}
