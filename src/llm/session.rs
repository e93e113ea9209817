//! Chat session: a conversation context that accumulates its own history

use super::types::{ChatPayload, GenerateRequest, Turn};
use super::{LlmError, LlmService};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Opaque handle to a remote conversation.
///
/// History grows as a side effect of successful `send` calls and cannot be
/// inspected or reset from outside.
pub struct ChatSession {
    service: Arc<dyn LlmService>,
    system_instruction: Option<String>,
    history: Mutex<Vec<Turn>>,
}

impl ChatSession {
    pub fn open(
        service: Arc<dyn LlmService>,
        system_instruction: Option<String>,
        prior_history: Vec<Turn>,
    ) -> Self {
        tracing::debug!(
            model = %service.model_id(),
            prior_turns = prior_history.len(),
            "Opened chat session"
        );
        Self {
            service,
            system_instruction,
            history: Mutex::new(prior_history),
        }
    }

    /// Send one user turn and return the reply text.
    ///
    /// The user turn and the reply are recorded only when the call succeeds
    /// with non-empty text.
    pub async fn send(&self, payload: ChatPayload) -> Result<String, LlmError> {
        let mut history = self.history.lock().await;

        let user_turn = Turn::user(payload.into_parts());
        let mut contents = history.clone();
        contents.push(user_turn.clone());

        let request = GenerateRequest {
            system_instruction: self.system_instruction.clone(),
            contents,
        };
        let reply = self.service.generate(&request).await?;
        if reply.text.is_empty() {
            return Err(LlmError::unknown("Reply contained no text"));
        }

        history.push(user_turn);
        history.push(Turn::model(reply.text.clone()));
        Ok(reply.text)
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }
}
