//! Conversation transcript
//!
//! The ordered, append-only list of chat turns shown to the user.

use chrono::Utc;
use std::fmt;
use thiserror::Error;

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Michai,
}

/// Origin of a message, used as the id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    Greeting,
    User,
    Reply,
    Fallback,
}

impl MessageOrigin {
    fn prefix(self) -> &'static str {
        match self {
            MessageOrigin::Greeting => "initial",
            MessageOrigin::User => "user",
            MessageOrigin::Reply => "michai",
            MessageOrigin::Fallback => "error",
        }
    }

    pub fn sender(self) -> Sender {
        match self {
            MessageOrigin::User => Sender::User,
            MessageOrigin::Greeting | MessageOrigin::Reply | MessageOrigin::Fallback => {
                Sender::Michai
            }
        }
    }
}

/// Unique message identifier: `{prefix}-{unix_millis}-{random}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(String);

impl MessageId {
    pub fn generate(origin: MessageOrigin) -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix: u32 = rand::random();
        Self(format!("{}-{millis}-{suffix:08x}", origin.prefix()))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One conversational turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    /// Data URI of an attached image (user turns only)
    pub image_url: Option<String>,
}

impl Message {
    pub fn new(origin: MessageOrigin, text: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            id: MessageId::generate(origin),
            text: text.into(),
            sender: origin.sender(),
            image_url,
        }
    }

    /// A message must carry text or an image
    pub fn has_content(&self) -> bool {
        !self.text.is_empty() || self.image_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Message has neither text nor image")]
    EmptyMessage,
    #[error("Message id already used: {0}")]
    DuplicateId(MessageId),
}

/// Append-only, turn-ordered message list
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) -> Result<&Message, TranscriptError> {
        if !message.has_content() {
            return Err(TranscriptError::EmptyMessage);
        }
        if self.messages.iter().any(|m| m.id == message.id) {
            return Err(TranscriptError::DuplicateId(message.id));
        }
        self.messages.push(message);
        Ok(&self.messages[self.messages.len() - 1])
    }

    #[allow(dead_code)] // Read by tests; the runtime broadcasts each append instead
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
