//! Michai Friend - a chatty AI companion in the terminal
//!
//! Conversation state machine driving a Gemini chat session, with image
//! attachments, emoji, dictation and spoken replies.

mod attachment;
mod config;
mod dictation;
mod llm;
mod runtime;
mod speech;
mod state_machine;
mod system_prompt;
mod terminal;
mod transcript;

use config::ChatConfig;
use dictation::{CommandDictation, DictationSource, NoDictation};
use llm::{ChatSession, GeminiService, LlmService, LoggingService};
use runtime::{ChatHandle, ChatRuntime};
use speech::{CommandSpeech, NoSpeech, SpeechSink};
use std::sync::Arc;
use system_prompt::SYSTEM_INSTRUCTION;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (stderr, so it stays out of the chat on stdout)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "michai=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration; a missing key stops here, before any UI
    let config = ChatConfig::from_env()?;

    let gemini = GeminiService::new(config.api_key, &config.model, config.gateway.as_deref())?;
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(gemini)));
    tracing::info!(model = %service.model_id(), "Chat service initialized");

    let session = ChatSession::open(service, Some(SYSTEM_INSTRUCTION.to_string()), Vec::new());

    let dictation: Box<dyn DictationSource> = match config.stt_command {
        Some(command) => Box::new(CommandDictation::new(command, config.lang)),
        None => Box::new(NoDictation::default()),
    };
    let speech: Box<dyn SpeechSink> = match config.tts_command {
        Some(command) => Box::new(CommandSpeech::new(command)),
        None => Box::new(NoSpeech::default()),
    };

    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let handle = ChatHandle {
        event_tx: event_tx.clone(),
        broadcast_tx: broadcast_tx.clone(),
    };

    // Subscribe before the runtime starts so the greeting is not missed
    let updates = handle.subscribe();

    let runtime = ChatRuntime::new(session, dictation, speech, event_rx, event_tx, broadcast_tx);
    let runtime_task = tokio::spawn(runtime.run());

    terminal::run(&handle, updates).await;

    runtime_task.abort();
    Ok(())
}
