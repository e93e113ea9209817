//! Property-based tests for the state machine
//!
//! These tests drive random event sequences through `transition` and check
//! that the controller invariants hold at every step.

use super::state::{ChatState, Phase};
use super::transition::{transition, TransitionError};
use super::{Effect, Event};
use crate::dictation::RecognitionResult;
use crate::llm::LlmErrorKind;
use crate::transcript::{Message, Sender};
use proptest::prelude::*;
use std::path::PathBuf;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-zA-Z ]{1,20}",
    ]
}

fn arb_data_uri() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just("data:image/png;base64,iVBORw0KGgo=".to_string()),
        1 => Just("data:image/png,AAAA".to_string()),
        1 => Just("data:image/jpeg;base64,".to_string()),
    ]
}

fn arb_recognition_result() -> impl Strategy<Value = RecognitionResult> {
    ("[a-z ]{0,10}", any::<bool>()).prop_map(|(transcript, is_final)| RecognitionResult {
        transcript,
        is_final,
    })
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::Unknown),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        1 => arb_text().prop_map(|text| Event::EditDraft { text }),
        1 => Just(Event::ToggleEmojiPicker),
        1 => prop_oneof![Just("🔥"), Just("👋"), Just("✨")]
            .prop_map(|g| Event::InsertEmoji { glyph: g.to_string() }),
        1 => Just(Event::AttachImage {
            path: PathBuf::from("pic.png")
        }),
        1 => arb_data_uri().prop_map(|data_uri| Event::ImageLoaded { data_uri }),
        1 => Just(Event::RemoveImage),
        1 => Just(Event::ToggleDictation),
        1 => (0usize..3, proptest::collection::vec(arb_recognition_result(), 0..4)).prop_map(
            |(result_index, results)| Event::DictationResult {
                result_index,
                results,
            }
        ),
        1 => Just(Event::DictationEnded),
        4 => Just(Event::Submit),
        2 => arb_text().prop_map(|text| Event::SubmitText { text }),
        2 => arb_text().prop_map(|text| Event::ReplyReceived { text }),
        2 => ("[a-z ]{1,20}", arb_error_kind())
            .prop_map(|(message, kind)| Event::ReplyFailed { message, kind }),
    ]
}

/// Applies transitions the way the runtime does, keeping a transcript model
#[derive(Default)]
struct Harness {
    state: ChatState,
    transcript: Vec<Message>,
    outstanding_sends: usize,
}

impl Harness {
    fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let result = transition(&self.state, event)?;
        self.state = result.new_state;
        for effect in &result.effects {
            match effect {
                Effect::AppendMessage {
                    origin,
                    text,
                    image_url,
                } => self
                    .transcript
                    .push(Message::new(*origin, text.clone(), image_url.clone())),
                Effect::SendPayload { .. } => self.outstanding_sends += 1,
                _ => {}
            }
        }
        Ok(result.effects)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_transcript_is_append_only(events in proptest::collection::vec(arb_event(), 1..60)) {
        let mut harness = Harness::default();
        for event in events {
            let before = harness.transcript.clone();
            let _ = harness.apply(event);
            prop_assert!(harness.transcript.len() >= before.len());
            prop_assert_eq!(&harness.transcript[..before.len()], &before[..]);
        }
    }

    #[test]
    fn prop_at_most_one_send_in_flight(events in proptest::collection::vec(arb_event(), 1..60)) {
        let mut harness = Harness::default();
        for event in events {
            let settles = matches!(event, Event::ReplyReceived { .. } | Event::ReplyFailed { .. });
            if harness.apply(event).is_ok() && settles {
                harness.outstanding_sends -= 1;
            }
            prop_assert!(harness.outstanding_sends <= 1);
            prop_assert_eq!(harness.outstanding_sends == 1, harness.state.phase == Phase::AwaitingReply);
        }
    }

    #[test]
    fn prop_rejections_have_a_reason(events in proptest::collection::vec(arb_event(), 1..60)) {
        let mut harness = Harness::default();
        for event in events {
            let is_submit = matches!(event, Event::Submit | Event::SubmitText { .. });
            let before = harness.state.clone();
            let len_before = harness.transcript.len();
            let outcome = harness.apply(event);
            match &outcome {
                Err(TransitionError::Busy) => {
                    prop_assert!(is_submit && before.is_in_flight());
                }
                Err(TransitionError::EmptyDraft) => {
                    prop_assert!(is_submit && !before.draft.is_sendable());
                }
                Err(TransitionError::InvalidTransition(_)) => {
                    prop_assert_eq!(before.phase, Phase::Idle);
                }
                Ok(_) => {}
            }
            if outcome.is_err() {
                prop_assert_eq!(&harness.state, &before);
                prop_assert_eq!(harness.transcript.len(), len_before);
            }
        }
    }

    #[test]
    fn prop_accepted_submit_appends_user_turn_first(
        events in proptest::collection::vec(arb_event(), 1..40),
    ) {
        let mut harness = Harness::default();
        for event in events {
            let is_submit = matches!(event, Event::Submit | Event::SubmitText { .. });
            let len_before = harness.transcript.len();
            if let Ok(effects) = harness.apply(event) {
                if is_submit {
                    prop_assert!(harness.transcript.len() > len_before);
                    prop_assert_eq!(harness.transcript[len_before].sender, Sender::User);
                    prop_assert!(harness.state.draft.text.is_empty());
                    prop_assert!(harness.state.draft.image.is_none());
                    prop_assert!(!effects.contains(&Effect::StartDictation));
                    prop_assert!(!harness.state.listening);
                }
            }
        }
    }

    #[test]
    fn prop_every_message_has_content(events in proptest::collection::vec(arb_event(), 1..60)) {
        let mut harness = Harness::default();
        for event in events {
            let _ = harness.apply(event);
        }
        for message in &harness.transcript {
            prop_assert!(message.has_content(), "empty message: {:?}", message);
        }
    }

    #[test]
    fn prop_settled_turn_appends_exactly_one_reply(
        text in arb_text(),
        fail in any::<bool>(),
    ) {
        let mut harness = Harness::default();
        harness.apply(Event::EditDraft { text: "hello".to_string() }).unwrap();
        harness.apply(Event::Submit).unwrap();
        let len_before = harness.transcript.len();

        let event = if fail {
            Event::ReplyFailed { message: "down".to_string(), kind: LlmErrorKind::ServerError }
        } else {
            Event::ReplyReceived { text }
        };
        harness.apply(event).unwrap();

        prop_assert_eq!(harness.transcript.len(), len_before + 1);
        prop_assert_eq!(harness.transcript[len_before].sender, Sender::Michai);
        prop_assert_eq!(harness.state.phase, Phase::Idle);
    }
}
