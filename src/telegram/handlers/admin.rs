//! Admin-gated actions: panel, add-video flow, user/video management

use lazy_regex::{lazy_regex, Lazy, Regex};
use teloxide::prelude::*;
use teloxide::types::ReplyMarkup;

use super::types::{sender_id, HandlerDeps, HandlerResult};
use crate::storage::db;
use crate::telegram::dialog::{advance_add_video, AddVideoStage, AddVideoStep, DialogInput, Flow};
use crate::telegram::keyboards;
use crate::telegram::notifications;

static DELETE_USER_RE: Lazy<Regex> = lazy_regex!(r"^delete_user_(\d+)$");
static DELETE_VIDEO_RE: Lazy<Regex> = lazy_regex!(r"^delete_video_(\d+)$");

/// Parse a `delete_user_<id>` payload; `None` for a non-numeric remainder.
pub fn parse_delete_user_payload(data: &str) -> Option<i64> {
    DELETE_USER_RE.captures(data).and_then(|c| c[1].parse().ok())
}

/// Parse a `delete_video_<id>` payload.
pub fn parse_delete_video_payload(data: &str) -> Option<i64> {
    DELETE_VIDEO_RE.captures(data).and_then(|c| c[1].parse().ok())
}

/// Admin membership check against the admins table.
///
/// An unreachable store denies access rather than granting it.
pub fn check_admin(deps: &HandlerDeps, telegram_id: i64) -> bool {
    let Some(conn) = deps.connection() else {
        return false;
    };
    db::is_admin(&conn, telegram_id).unwrap_or_else(|e| {
        log::error!("Failed to check admin membership for {}: {}", telegram_id, e);
        false
    })
}

/// Handle /admin: show the panel keyboard, or deny.
pub async fn handle_admin_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };
    if !check_admin(deps, telegram_id) {
        bot.send_message(msg.chat.id, "Access denied.").await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Admin panel:")
        .reply_markup(keyboards::admin_panel())
        .await?;
    Ok(())
}

/// "Add Video" menu label: open the add-video flow at the title stage.
/// Non-admins are denied and no session is created.
pub async fn handle_add_video_entry(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };
    if !check_admin(deps, telegram_id) {
        bot.send_message(msg.chat.id, "Access denied.").await?;
        return Ok(());
    }

    deps.sessions
        .open(telegram_id, Flow::AddVideo(AddVideoStage::AwaitingTitle));
    bot.send_message(msg.chat.id, "Enter video title:").await?;
    Ok(())
}

/// Handle a message while an add-video session is open.
pub async fn handle_add_video_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };
    let Some(Flow::AddVideo(stage)) = deps.sessions.take(telegram_id) else {
        return Ok(());
    };

    let input = DialogInput::from_message(msg);
    let (next, step) = advance_add_video(stage, &input);
    if let Some(next) = next {
        deps.sessions.open(telegram_id, Flow::AddVideo(next));
    }

    match step {
        AddVideoStep::RepromptTitle => {
            bot.send_message(msg.chat.id, "Enter video title:").await?;
        }
        AddVideoStep::AskLink | AddVideoStep::RepromptLink => {
            bot.send_message(msg.chat.id, "Enter YouTube link:").await?;
        }
        AddVideoStep::Created { title, link } => {
            if let Some(conn) = deps.connection() {
                if let Err(e) = db::create_video(&conn, &title, &link) {
                    log::error!("Failed to create video '{}': {}", title, e);
                }
            }
            log::info!("Video '{}' added by admin {}", title, telegram_id);

            bot.send_message(msg.chat.id, "Video added successfully.")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;

            notifications::broadcast_new_video(bot, deps, &link).await;
        }
    }
    Ok(())
}

/// "View Users": one card per user with an inline delete button.
pub async fn handle_view_users(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };
    if !check_admin(deps, telegram_id) {
        bot.send_message(msg.chat.id, "Access denied.").await?;
        return Ok(());
    }

    let users = deps
        .connection()
        .map(|conn| {
            db::get_all_users(&conn).unwrap_or_else(|e| {
                log::error!("Failed to list users: {}", e);
                Vec::new()
            })
        })
        .unwrap_or_default();

    if users.is_empty() {
        bot.send_message(msg.chat.id, "No registered users.").await?;
        return Ok(());
    }

    for user in users {
        let text = format!(
            "Name: {}\nPhone: {}\nTelegram ID: {}",
            user.name, user.phone, user.telegram_id
        );
        bot.send_message(msg.chat.id, text)
            .reply_markup(keyboards::delete_user_button(user.telegram_id))
            .await?;
    }
    Ok(())
}

/// "Manage Videos": one card per video with an inline delete button.
pub async fn handle_manage_videos(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };
    if !check_admin(deps, telegram_id) {
        bot.send_message(msg.chat.id, "Access denied.").await?;
        return Ok(());
    }

    let videos = deps
        .connection()
        .map(|conn| {
            db::get_all_videos(&conn).unwrap_or_else(|e| {
                log::error!("Failed to list videos: {}", e);
                Vec::new()
            })
        })
        .unwrap_or_default();

    if videos.is_empty() {
        bot.send_message(msg.chat.id, "No videos available.").await?;
        return Ok(());
    }

    for video in videos {
        let text = format!("Title: {}\nLink: {}", video.title, video.youtube_link);
        bot.send_message(msg.chat.id, text)
            .reply_markup(keyboards::delete_video_button(video.id))
            .await?;
    }
    Ok(())
}

/// `delete_user_<id>` callback: delete the row (absent ids are a no-op) and
/// edit the originating card to a confirmation.
pub async fn handle_delete_user_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> HandlerResult {
    let caller_id = i64::try_from(q.from.id.0).unwrap_or(0);
    if !check_admin(deps, caller_id) {
        bot.answer_callback_query(q.id.clone())
            .text("Access denied.")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    let data = q.data.as_deref().unwrap_or_default();
    let Some(telegram_id) = parse_delete_user_payload(data) else {
        bot.answer_callback_query(q.id.clone())
            .text("Invalid user ID.")
            .show_alert(true)
            .await?;
        return Ok(());
    };

    if let Some(conn) = deps.connection() {
        match db::delete_user_by_telegram_id(&conn, telegram_id) {
            Ok(removed) => log::info!("Deleted {} user row(s) for {}", removed, telegram_id),
            Err(e) => log::error!("Failed to delete user {}: {}", telegram_id, e),
        }
    }

    if let Some((chat_id, message_id)) = q.message.as_ref().map(|m| (m.chat().id, m.id())) {
        bot.edit_message_text(chat_id, message_id, "User deleted successfully.")
            .await?;
    }
    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}

/// `delete_video_<id>` callback, same shape as user deletion.
pub async fn handle_delete_video_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> HandlerResult {
    let caller_id = i64::try_from(q.from.id.0).unwrap_or(0);
    if !check_admin(deps, caller_id) {
        bot.answer_callback_query(q.id.clone())
            .text("Access denied.")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    let data = q.data.as_deref().unwrap_or_default();
    let Some(video_id) = parse_delete_video_payload(data) else {
        bot.answer_callback_query(q.id.clone())
            .text("Invalid video ID.")
            .show_alert(true)
            .await?;
        return Ok(());
    };

    if let Some(conn) = deps.connection() {
        match db::delete_video_by_id(&conn, video_id) {
            Ok(removed) => log::info!("Deleted {} video row(s) for id {}", removed, video_id),
            Err(e) => log::error!("Failed to delete video {}: {}", video_id, e),
        }
    }

    if let Some((chat_id, message_id)) = q.message.as_ref().map(|m| (m.chat().id, m.id())) {
        bot.edit_message_text(chat_id, message_id, "Video deleted successfully.")
            .await?;
    }
    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delete_user_payload() {
        assert_eq!(parse_delete_user_payload("delete_user_42"), Some(42));
        assert_eq!(parse_delete_user_payload("delete_user_999999"), Some(999_999));
        assert_eq!(parse_delete_user_payload("delete_user_"), None);
        assert_eq!(parse_delete_user_payload("delete_user_abc"), None);
        assert_eq!(parse_delete_user_payload("delete_user_-5"), None);
        assert_eq!(parse_delete_user_payload("delete_video_42"), None);
        assert_eq!(parse_delete_user_payload("delete_user_42extra"), None);
    }

    #[test]
    fn test_parse_delete_video_payload() {
        assert_eq!(parse_delete_video_payload("delete_video_7"), Some(7));
        assert_eq!(parse_delete_video_payload("delete_video_x"), None);
        assert_eq!(parse_delete_video_payload("delete_user_7"), None);
    }

    #[test]
    fn test_parse_overflowing_id_is_invalid() {
        // Digits only, but larger than i64::MAX
        assert_eq!(parse_delete_user_payload("delete_user_99999999999999999999"), None);
    }
}
