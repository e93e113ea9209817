//! Effects produced by state transitions

use crate::llm::ChatPayload;
use crate::transcript::MessageOrigin;
use std::path::PathBuf;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the transcript
    AppendMessage {
        origin: MessageOrigin,
        text: String,
        image_url: Option<String>,
    },

    /// Send a payload through the chat session (spawns as background task)
    SendPayload { payload: ChatPayload },

    /// Read an image file into a data URI (spawns as background task)
    LoadImage { path: PathBuf },

    StartDictation,
    StopDictation,

    /// Record a per-turn failure that the user only sees as the fallback reply
    LogFailure { message: String },
}

impl Effect {
    pub fn append_user_message(text: impl Into<String>, image_url: Option<String>) -> Self {
        Effect::AppendMessage {
            origin: MessageOrigin::User,
            text: text.into(),
            image_url,
        }
    }

    pub fn append_reply(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            origin: MessageOrigin::Reply,
            text: text.into(),
            image_url: None,
        }
    }

    pub fn append_fallback() -> Self {
        Effect::AppendMessage {
            origin: MessageOrigin::Fallback,
            text: super::transition::FALLBACK_REPLY.to_string(),
            image_url: None,
        }
    }
}
