//! Pure state transition function
//!
//! Every decision about drafts, submission gating and reply handling is made
//! here without I/O. The runtime executes the returned effects.

use super::state::{ChatState, Draft, Phase};
use super::{Effect, Event};
use crate::dictation::compose_transcript;
use crate::llm::ChatPayload;
use thiserror::Error;

/// Substitute reply for any failed turn. Raw errors are never shown.
pub const FALLBACK_REPLY: &str = "Whoops, something went sideways. Let's try that again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event is rejected without any state change
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Nothing to send: draft text is blank and no image is attached")]
    EmptyDraft,
    #[error("Still waiting for the previous reply")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(state: &ChatState, event: Event) -> Result<TransitionResult, TransitionError> {
    let mut next = state.clone();

    match event {
        // ============================================================
        // Draft editing
        // ============================================================
        Event::EditDraft { text } => {
            next.draft.text = text;
            Ok(TransitionResult::new(next))
        }

        Event::InsertEmoji { glyph } => {
            next.draft.text.push_str(&glyph);
            Ok(TransitionResult::new(next))
        }

        Event::ToggleEmojiPicker => {
            next.emoji_picker_open = !state.emoji_picker_open;
            Ok(TransitionResult::new(next))
        }

        Event::AttachImage { path } => {
            Ok(TransitionResult::new(next).with_effect(Effect::LoadImage { path }))
        }

        // A completed read always replaces any previously staged image
        Event::ImageLoaded { data_uri } => {
            next.draft.image = Some(data_uri);
            Ok(TransitionResult::new(next))
        }

        Event::RemoveImage => {
            next.draft.image = None;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Voice dictation
        // ============================================================
        Event::ToggleDictation => {
            next.emoji_picker_open = false;
            next.listening = !state.listening;
            let effect = if state.listening {
                Effect::StopDictation
            } else {
                Effect::StartDictation
            };
            Ok(TransitionResult::new(next).with_effect(effect))
        }

        Event::DictationResult {
            result_index,
            results,
        } => {
            // Late results from a stream we already stopped must not
            // resurrect a draft that was just sent.
            if state.listening {
                next.draft.text = compose_transcript(result_index, &results);
            }
            Ok(TransitionResult::new(next))
        }

        Event::DictationEnded => {
            next.listening = false;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Submission
        // ============================================================
        Event::Submit => submit(state, next),

        Event::SubmitText { text } => {
            if state.is_in_flight() {
                return Err(TransitionError::Busy);
            }
            join_typed(&mut next.draft.text, &text);
            submit(&next.clone(), next)
        }

        Event::ReplyReceived { text } => {
            if state.phase != Phase::AwaitingReply {
                return Err(TransitionError::InvalidTransition(
                    "reply received with no request in flight".to_string(),
                ));
            }
            next.phase = Phase::Idle;
            if text.is_empty() {
                return Ok(TransitionResult::new(next).with_effects([
                    Effect::LogFailure {
                        message: "Reply contained no text".to_string(),
                    },
                    Effect::append_fallback(),
                ]));
            }
            Ok(TransitionResult::new(next).with_effect(Effect::append_reply(text)))
        }

        Event::ReplyFailed { message, kind } => {
            if state.phase != Phase::AwaitingReply {
                return Err(TransitionError::InvalidTransition(
                    "failure reported with no request in flight".to_string(),
                ));
            }
            next.phase = Phase::Idle;
            Ok(TransitionResult::new(next).with_effects([
                Effect::LogFailure {
                    message: format!("{}: {message}", kind.as_str()),
                },
                Effect::append_fallback(),
            ]))
        }
    }
}

/// Typed words never run into what is already in the draft
fn join_typed(draft: &mut String, text: &str) {
    if !draft.is_empty() && !draft.ends_with(char::is_whitespace) && !text.is_empty() {
        draft.push(' ');
    }
    draft.push_str(text);
}

fn submit(state: &ChatState, mut next: ChatState) -> Result<TransitionResult, TransitionError> {
    if state.is_in_flight() {
        return Err(TransitionError::Busy);
    }
    if !state.draft.is_sendable() {
        return Err(TransitionError::EmptyDraft);
    }

    let mut effects = Vec::new();

    // Dictation and typed submission are exclusive at the moment of send
    if state.listening {
        next.listening = false;
        effects.push(Effect::StopDictation);
    }

    let Draft { text, image } = std::mem::take(&mut next.draft);
    next.emoji_picker_open = false;

    // Optimistic insert: the user's turn is visible before the network call
    effects.push(Effect::append_user_message(text.clone(), image.clone()));

    match ChatPayload::from_draft(&text, image.as_deref()) {
        Ok(payload) => {
            next.phase = Phase::AwaitingReply;
            effects.push(Effect::SendPayload { payload });
        }
        Err(e) => {
            effects.push(Effect::LogFailure {
                message: e.to_string(),
            });
            effects.push(Effect::append_fallback());
        }
    }

    Ok(TransitionResult::new(next).with_effects(effects))
}
