//! Dispatcher schema and handler chain builders

use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{is_command, sender_id, HandlerDeps, HandlerError};
use super::{admin, registration, videos};
use crate::telegram::bot::Command;
use crate::telegram::dialog::FlowKind;

/// Creates the main dispatcher schema for the bot.
///
/// Branch order encodes the router precedence: admin-gated callbacks and
/// flows first, then registration, then the free-text video-title lookup.
/// The same tree serves production dispatch and integration tests.
///
/// # Arguments
/// * `deps` - Handler dependencies (database pool, session store)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_delete_user = deps.clone();
    let deps_delete_video = deps.clone();
    let deps_add_video_session = deps.clone();
    let deps_add_video_entry = deps.clone();
    let deps_view_users = deps.clone();
    let deps_manage_videos = deps.clone();
    let deps_commands = deps.clone();
    let deps_registration = deps.clone();

    dptree::entry()
        // Admin-gated lane: delete callbacks and menu-label actions.
        .branch(delete_user_callback_handler(deps_delete_user))
        .branch(delete_video_callback_handler(deps_delete_video))
        // An open add-video dialog consumes free text before the menu labels,
        // so a title may legitimately spell "View Users".
        .branch(add_video_session_handler(deps_add_video_session))
        .branch(add_video_entry_handler(deps_add_video_entry))
        .branch(view_users_handler(deps_view_users))
        .branch(manage_videos_handler(deps_manage_videos))
        // Commands: /start (registration entry) and /admin.
        .branch(command_handler(deps_commands))
        // Registration lane: input while a registration dialog is open.
        .branch(registration_session_handler(deps_registration))
        // Video-selection lane: any plain text nothing else claimed.
        .branch(video_selection_handler(deps))
}

/// Matcher for an exact admin menu label
fn has_label(msg: &Message, label: &str) -> bool {
    msg.text().map(|text| text == label).unwrap_or(false)
}

/// Handler for the "Add Video" menu label (flow entry)
fn add_video_entry_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| has_label(&msg, "Add Video"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { admin::handle_add_video_entry(&bot, &msg, &deps).await }
        })
}

/// Handler for the "View Users" menu label
fn view_users_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| has_label(&msg, "View Users"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { admin::handle_view_users(&bot, &msg, &deps).await }
        })
}

/// Handler for the "Manage Videos" menu label
fn manage_videos_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| has_label(&msg, "Manage Videos"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { admin::handle_manage_videos(&bot, &msg, &deps).await }
        })
}

/// Handler for messages while an add-video dialog is open
fn add_video_session_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let sessions = Arc::clone(&deps.sessions);
    Update::filter_message()
        .filter(move |msg: Message| {
            if is_command(&msg) {
                return false;
            }
            sender_id(&msg)
                .map(|id| sessions.kind(id) == Some(FlowKind::AddVideo))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { admin::handle_add_video_message(&bot, &msg, &deps).await }
        })
}

/// Handler for /start and /admin
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                match cmd {
                    Command::Start => registration::handle_start(&bot, &msg, &deps).await,
                    Command::Admin => admin::handle_admin_command(&bot, &msg, &deps).await,
                }
            }
        })
}

/// Handler for messages while a registration dialog is open
fn registration_session_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let sessions = Arc::clone(&deps.sessions);
    Update::filter_message()
        .filter(move |msg: Message| {
            if is_command(&msg) {
                return false;
            }
            sender_id(&msg)
                .map(|id| sessions.kind(id) == Some(FlowKind::Registration))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { registration::handle_registration_message(&bot, &msg, &deps).await }
        })
}

/// Fallback handler treating plain text as a video title
fn video_selection_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some() && !is_command(&msg))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { videos::handle_video_selection(&bot, &msg, &deps).await }
        })
}

/// Handler for `delete_user_<id>` callback buttons
fn delete_user_callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query()
        .filter(|q: CallbackQuery| {
            q.data
                .as_deref()
                .map(|data| data.starts_with("delete_user_"))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, q: CallbackQuery| {
            let deps = deps.clone();
            async move { admin::handle_delete_user_callback(&bot, &q, &deps).await }
        })
}

/// Handler for `delete_video_<id>` callback buttons
fn delete_video_callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query()
        .filter(|q: CallbackQuery| {
            q.data
                .as_deref()
                .map(|data| data.starts_with("delete_video_"))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, q: CallbackQuery| {
            let deps = deps.clone();
            async move { admin::handle_delete_video_callback(&bot, &q, &deps).await }
        })
}
