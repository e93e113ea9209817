//! Chat controller state types

/// Whether a send is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Ready to accept a submission
    #[default]
    Idle,
    /// A request is in flight; further submissions are rejected
    AwaitingReply,
}

/// Unsent input the user is composing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub text: String,
    /// Data URI of the staged image, at most one
    pub image: Option<String>,
}

impl Draft {
    /// Blankness is judged on trimmed text; the text itself is kept verbatim
    pub fn is_sendable(&self) -> bool {
        !self.text.trim().is_empty() || self.image.as_deref().is_some_and(|uri| !uri.is_empty())
    }
}

/// Everything the controller decides on, apart from the transcript
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatState {
    pub phase: Phase,
    pub draft: Draft,
    pub listening: bool,
    pub emoji_picker_open: bool,
}

impl ChatState {
    pub fn is_in_flight(&self) -> bool {
        self.phase == Phase::AwaitingReply
    }
}
