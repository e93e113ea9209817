//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::llm::{ChatPayload, ChatSession, LlmError};
use async_trait::async_trait;
use std::sync::Arc;

/// Client for sending chat turns
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one user turn and return the reply text
    async fn send(&self, payload: ChatPayload) -> Result<String, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: ChatClient + ?Sized> ChatClient for Arc<T> {
    async fn send(&self, payload: ChatPayload) -> Result<String, LlmError> {
        (**self).send(payload).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl ChatClient for ChatSession {
    async fn send(&self, payload: ChatPayload) -> Result<String, LlmError> {
        ChatSession::send(self, payload).await
    }

    fn model_id(&self) -> &str {
        ChatSession::model_id(self)
    }
}
