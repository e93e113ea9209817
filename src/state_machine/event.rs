//! Events that can occur in a chat

use crate::llm::LlmErrorKind;
use crate::dictation::RecognitionResult;
use std::path::PathBuf;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Text entry
    /// Replace the draft text
    EditDraft { text: String },

    // Emoji picker
    ToggleEmojiPicker,
    InsertEmoji { glyph: String },

    // Image attachment
    AttachImage { path: PathBuf },
    ImageLoaded { data_uri: String },
    RemoveImage,

    // Voice dictation
    ToggleDictation,
    DictationResult {
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    DictationEnded,

    // Sending
    Submit,
    /// A typed line joined onto the draft and submitted as one step; refused
    /// whole while a reply is pending
    SubmitText { text: String },
    ReplyReceived { text: String },
    ReplyFailed { message: String, kind: LlmErrorKind },
}
