//! Runtime for the chat controller
//!
//! Owns the transcript and drives the pure state machine: every input is an
//! `Event` on one channel, and every observable change goes out as a
//! `UiEvent` on a broadcast channel.

mod executor;
pub mod traits;


pub use executor::ChatRuntime;

use crate::state_machine::{ChatState, Event};
use crate::transcript::Message;
use tokio::sync::{broadcast, mpsc};

/// Events sent to presentation layers
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A turn was appended to the transcript
    MessageAppended(Message),
    /// Draft, in-flight flag, picker or dictation state changed
    StateChanged(ChatState),
    /// An input was refused (blank draft, reply pending)
    Rejected { reason: String },
}

/// Handle to interact with a running chat
#[derive(Clone)]
pub struct ChatHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<UiEvent>,
}

impl ChatHandle {
    /// Send an event to the runtime
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    /// Subscribe to chat updates
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.broadcast_tx.subscribe()
    }
}
