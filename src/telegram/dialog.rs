//! Conversation state machines and the in-process session store.
//!
//! Two independent flows exist: user registration (name, then phone via a
//! shared contact) and admin add-video (title, then link). Stages are
//! tagged-variant enums carrying the partial field collected so far, and the
//! `advance_*` functions are the only allowed transitions, so a flow can
//! never skip a stage. Sessions live in process memory keyed by Telegram ID
//! and expire lazily after a period of inactivity.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use teloxide::types::Message;

use crate::core::config;

/// Stages of the registration flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStage {
    /// Waiting for the user's full name as free text
    AwaitingName,
    /// Name collected; waiting for a contact-share payload
    AwaitingPhone { name: String },
}

/// Stages of the admin add-video flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddVideoStage {
    /// Waiting for the video title as free text
    AwaitingTitle,
    /// Title collected; waiting for the link as free text
    AwaitingLink { title: String },
}

/// A user's open dialog, one flow at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Registration(RegistrationStage),
    AddVideo(AddVideoStage),
}

/// Flow discriminant, used by dispatch filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Registration,
    AddVideo,
}

impl Flow {
    pub fn kind(&self) -> FlowKind {
        match self {
            Flow::Registration(_) => FlowKind::Registration,
            Flow::AddVideo(_) => FlowKind::AddVideo,
        }
    }
}

/// Classified inbound message payload fed into a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogInput {
    Text(String),
    Contact { phone_number: String },
    /// Anything else (photo, sticker, empty contact card, ...)
    Other,
}

impl DialogInput {
    pub fn from_message(msg: &Message) -> Self {
        if let Some(contact) = msg.contact() {
            DialogInput::Contact {
                phone_number: contact.phone_number.clone(),
            }
        } else if let Some(text) = msg.text() {
            DialogInput::Text(text.to_string())
        } else {
            DialogInput::Other
        }
    }
}

/// Outcome of one registration step; tells the handler what to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStep {
    RepromptName,
    AskPhone,
    RepromptPhone,
    Registered { name: String, phone: String },
}

/// Advance the registration flow by one input.
///
/// Returns the stage to keep the session at (`None` means the flow is done)
/// together with the step the handler should act on. Invalid input re-issues
/// the current prompt and stays put; there is no retry cap.
pub fn advance_registration(
    stage: RegistrationStage,
    input: &DialogInput,
) -> (Option<RegistrationStage>, RegistrationStep) {
    match stage {
        RegistrationStage::AwaitingName => match input {
            DialogInput::Text(text) if !text.trim().is_empty() => {
                let name = text.trim().to_string();
                (
                    Some(RegistrationStage::AwaitingPhone { name }),
                    RegistrationStep::AskPhone,
                )
            }
            _ => (
                Some(RegistrationStage::AwaitingName),
                RegistrationStep::RepromptName,
            ),
        },
        RegistrationStage::AwaitingPhone { name } => match input {
            DialogInput::Contact { phone_number } if !phone_number.is_empty() => {
                if name.trim().is_empty() {
                    // Should not happen (empty names are never stored), but if
                    // the remembered name is gone, restart at the name stage.
                    (
                        Some(RegistrationStage::AwaitingName),
                        RegistrationStep::RepromptName,
                    )
                } else {
                    (
                        None,
                        RegistrationStep::Registered {
                            name,
                            phone: phone_number.clone(),
                        },
                    )
                }
            }
            _ => (
                Some(RegistrationStage::AwaitingPhone { name }),
                RegistrationStep::RepromptPhone,
            ),
        },
    }
}

/// Outcome of one add-video step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddVideoStep {
    RepromptTitle,
    AskLink,
    RepromptLink,
    Created { title: String, link: String },
}

/// Advance the admin add-video flow by one input.
pub fn advance_add_video(stage: AddVideoStage, input: &DialogInput) -> (Option<AddVideoStage>, AddVideoStep) {
    match stage {
        AddVideoStage::AwaitingTitle => match input {
            DialogInput::Text(text) if !text.trim().is_empty() => {
                let title = text.trim().to_string();
                (Some(AddVideoStage::AwaitingLink { title }), AddVideoStep::AskLink)
            }
            _ => (Some(AddVideoStage::AwaitingTitle), AddVideoStep::RepromptTitle),
        },
        AddVideoStage::AwaitingLink { title } => match input {
            DialogInput::Text(text) if !text.trim().is_empty() => {
                if title.trim().is_empty() {
                    // Remembered title lost: loop back to the title stage
                    // rather than storing a broken row.
                    (Some(AddVideoStage::AwaitingTitle), AddVideoStep::RepromptTitle)
                } else {
                    (
                        None,
                        AddVideoStep::Created {
                            title,
                            link: text.trim().to_string(),
                        },
                    )
                }
            }
            _ => (Some(AddVideoStage::AwaitingLink { title }), AddVideoStep::RepromptLink),
        },
    }
}

struct SessionEntry {
    flow: Flow,
    touched: Instant,
}

/// In-process conversation sessions, keyed by Telegram ID.
///
/// Mutated only by the request handling the corresponding user's message.
/// Not shared across instances; a process restart drops all open dialogs.
pub struct SessionStore {
    sessions: DashMap<i64, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(config::session::ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Open (or replace) the session for a user.
    pub fn open(&self, telegram_id: i64, flow: Flow) {
        self.sessions.insert(
            telegram_id,
            SessionEntry {
                flow,
                touched: Instant::now(),
            },
        );
    }

    /// Flow kind of the user's open session, if any. Expired sessions are
    /// evicted here, on the user's next message.
    pub fn kind(&self, telegram_id: i64) -> Option<FlowKind> {
        if self.evict_if_expired(telegram_id) {
            return None;
        }
        self.sessions.get(&telegram_id).map(|entry| entry.flow.kind())
    }

    /// Remove and return the user's open session.
    ///
    /// Handlers take the flow, advance it, and re-open the session when the
    /// flow has a next stage.
    pub fn take(&self, telegram_id: i64) -> Option<Flow> {
        if self.evict_if_expired(telegram_id) {
            return None;
        }
        self.sessions.remove(&telegram_id).map(|(_, entry)| entry.flow)
    }

    /// Drop the user's session, if any.
    pub fn close(&self, telegram_id: i64) {
        self.sessions.remove(&telegram_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_if_expired(&self, telegram_id: i64) -> bool {
        let expired = self
            .sessions
            .get(&telegram_id)
            .map(|entry| entry.touched.elapsed() > self.ttl)
            .unwrap_or(false);
        if expired {
            self.sessions.remove(&telegram_id);
        }
        expired
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
