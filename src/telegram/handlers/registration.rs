//! Registration flow: collect name, then phone via a shared contact

use teloxide::prelude::*;
use teloxide::types::ChatId;

use super::types::{sender_id, HandlerDeps, HandlerResult};
use crate::storage::db;
use crate::telegram::dialog::{
    advance_registration, DialogInput, Flow, RegistrationStage, RegistrationStep,
};
use crate::telegram::keyboards;

/// Handle /start: existing users get the video menu; new users enter the
/// registration flow at the name stage. A /start while a dialog is open
/// resets it.
pub async fn handle_start(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };

    let existing = deps.connection().and_then(|conn| {
        db::get_user_by_telegram_id(&conn, telegram_id).unwrap_or_else(|e| {
            log::error!("Failed to look up user {}: {}", telegram_id, e);
            None
        })
    });

    if existing.is_some() {
        deps.sessions.close(telegram_id);
        send_video_menu(bot, msg.chat.id, deps, "Welcome back! Choose a video below.").await?;
        return Ok(());
    }

    deps.sessions
        .open(telegram_id, Flow::Registration(RegistrationStage::AwaitingName));
    bot.send_message(msg.chat.id, "Please enter your full name:").await?;
    Ok(())
}

/// Handle a message while a registration session is open.
pub async fn handle_registration_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> HandlerResult {
    let Some(telegram_id) = sender_id(msg) else {
        return Ok(());
    };
    let Some(Flow::Registration(stage)) = deps.sessions.take(telegram_id) else {
        // Session expired or was replaced between filter and endpoint.
        return Ok(());
    };

    let input = DialogInput::from_message(msg);
    let (next, step) = advance_registration(stage, &input);
    if let Some(next) = next {
        deps.sessions.open(telegram_id, Flow::Registration(next));
    }

    match step {
        RegistrationStep::RepromptName => {
            bot.send_message(msg.chat.id, "Please enter your full name:").await?;
        }
        RegistrationStep::AskPhone => {
            bot.send_message(msg.chat.id, "Please share your phone number:")
                .reply_markup(keyboards::contact_request())
                .await?;
        }
        RegistrationStep::RepromptPhone => {
            bot.send_message(msg.chat.id, "Please share your phone number using the button.")
                .await?;
        }
        RegistrationStep::Registered { name, phone } => {
            if let Some(conn) = deps.connection() {
                if let Err(e) = db::create_user(&conn, telegram_id, &name, &phone) {
                    log::error!("Failed to create user {}: {}", telegram_id, e);
                }
            }
            log::info!("User {} registered", telegram_id);
            finish_registration(bot, msg.chat.id, deps).await?;
        }
    }
    Ok(())
}

/// Post-registration reply: success message with the video menu attached, or
/// followed by the explicit empty-state message when no videos exist yet.
async fn finish_registration(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> HandlerResult {
    let titles = video_titles(deps);
    if titles.is_empty() {
        bot.send_message(chat_id, "Registration successful! Choose a video below.")
            .await?;
        bot.send_message(chat_id, "No videos available yet.").await?;
    } else {
        bot.send_message(chat_id, "Registration successful! Choose a video below.")
            .reply_markup(keyboards::video_menu(&titles))
            .await?;
    }
    Ok(())
}

/// Send the video menu with the given prompt, or the empty-state message
/// when no videos exist.
pub async fn send_video_menu(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps, prompt: &str) -> HandlerResult {
    let titles = video_titles(deps);
    if titles.is_empty() {
        bot.send_message(chat_id, "No videos available yet.").await?;
    } else {
        bot.send_message(chat_id, prompt)
            .reply_markup(keyboards::video_menu(&titles))
            .await?;
    }
    Ok(())
}

fn video_titles(deps: &HandlerDeps) -> Vec<String> {
    let Some(conn) = deps.connection() else {
        return Vec::new();
    };
    match db::get_all_videos(&conn) {
        Ok(videos) => videos.into_iter().map(|video| video.title).collect(),
        Err(e) => {
            log::error!("Failed to list videos: {}", e);
            Vec::new()
        }
    }
}
