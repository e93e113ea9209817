//! Chat runtime executor

use super::traits::ChatClient;
use super::UiEvent;

use crate::attachment::load_image;
use crate::dictation::DictationSource;
use crate::speech::SpeechSink;
use crate::state_machine::{transition, ChatState, Effect, Event};
use crate::system_prompt::GREETING;
use crate::transcript::{Message, MessageOrigin, Sender, Transcript};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Generic chat runtime that can work with any client, recognizer and synthesizer
pub struct ChatRuntime<C, D, S>
where
    C: ChatClient + 'static,
    D: DictationSource,
    S: SpeechSink,
{
    state: ChatState,
    transcript: Transcript,
    client: Arc<C>,
    dictation: D,
    speech: S,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<UiEvent>,
}

impl<C, D, S> ChatRuntime<C, D, S>
where
    C: ChatClient + 'static,
    D: DictationSource,
    S: SpeechSink,
{
    pub fn new(
        client: C,
        dictation: D,
        speech: S,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            state: ChatState::default(),
            transcript: Transcript::new(),
            client: Arc::new(client),
            dictation,
            speech,
            event_rx,
            event_tx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(model = %self.client.model_id(), "Starting chat runtime");

        self.greet();

        // Process events in a loop - no recursion
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        self.dictation.stop();
        self.speech.cancel();
        tracing::info!(messages = self.transcript.len(), "Chat runtime stopped");
    }

    /// Seed the transcript with the greeting
    fn greet(&mut self) {
        self.execute_effect(Effect::AppendMessage {
            origin: MessageOrigin::Greeting,
            text: GREETING.to_string(),
            image_url: None,
        });
    }

    fn process_event(&mut self, event: Event) {
        // Effects may generate follow-up events that are handled locally
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            // Pure state transition
            let result = match transition(&self.state, current_event) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(reason = %e, "Event rejected");
                    let _ = self.broadcast_tx.send(UiEvent::Rejected {
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            // Update state
            let old_state = std::mem::replace(&mut self.state, result.new_state);
            if old_state != self.state {
                let _ = self
                    .broadcast_tx
                    .send(UiEvent::StateChanged(self.state.clone()));
            }

            // Execute effects and collect generated events
            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect) {
                    events_to_process.push(generated_event);
                }
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::AppendMessage {
                origin,
                text,
                image_url,
            } => {
                let message = Message::new(origin, text, image_url);
                match self.transcript.append(message) {
                    Ok(appended) => {
                        tracing::debug!(id = %appended.id, sender = ?appended.sender, "Message appended");
                        // Any new turn cuts off the reply being read out
                        self.speech.cancel();
                        if appended.sender == Sender::Michai {
                            self.speech.speak(&appended.text);
                        }
                        let _ = self
                            .broadcast_tx
                            .send(UiEvent::MessageAppended(appended.clone()));
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to append message"),
                }
                None
            }

            Effect::SendPayload { payload } => {
                // Spawn the request as background task; the reply comes back as an event
                let client = self.client.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tracing::info!("Sending chat turn (background)");
                    let event = match client.send(payload).await {
                        Ok(text) => Event::ReplyReceived { text },
                        Err(e) => Event::ReplyFailed {
                            message: e.message,
                            kind: e.kind,
                        },
                    };
                    let _ = event_tx.send(event).await;
                });

                None
            }

            Effect::LoadImage { path } => {
                let event_tx = self.event_tx.clone();
                let broadcast_tx = self.broadcast_tx.clone();

                tokio::spawn(async move {
                    match load_image(&path).await {
                        Ok(data_uri) => {
                            let _ = event_tx.send(Event::ImageLoaded { data_uri }).await;
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "Failed to load image");
                            let _ = broadcast_tx.send(UiEvent::Rejected {
                                reason: e.to_string(),
                            });
                        }
                    }
                });

                None
            }

            Effect::StartDictation => match self.dictation.start(self.event_tx.clone()) {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Dictation unavailable");
                    Some(Event::DictationEnded)
                }
            },

            Effect::StopDictation => {
                self.dictation.stop();
                None
            }

            Effect::LogFailure { message } => {
                tracing::error!(error = %message, "Chat turn failed");
                None
            }
        }
    }
}
