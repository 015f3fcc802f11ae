//! Free-text video-title selection for registered users

use teloxide::prelude::*;

use super::types::{sender_id, HandlerDeps, HandlerResult};
use crate::storage::db;

/// Catch-all for plain text no other lane claimed: treat it as an exact
/// video title. Unregistered senders and unknown titles get no reply.
pub async fn handle_video_selection(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };
    let Some(title) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(());
    };
    let Some(conn) = deps.connection() else {
        return Ok(());
    };

    let registered = db::get_user_by_telegram_id(&conn, telegram_id)
        .unwrap_or_else(|e| {
            log::error!("Failed to look up user {}: {}", telegram_id, e);
            None
        })
        .is_some();
    if !registered {
        return Ok(());
    }

    let video = db::get_video_by_title(&conn, title).unwrap_or_else(|e| {
        log::error!("Failed to look up video '{}': {}", title, e);
        None
    });

    if let Some(video) = video {
        bot.send_message(msg.chat.id, format!("Here is your video:\n{}", video.youtube_link))
            .await?;
    }
    Ok(())
}
