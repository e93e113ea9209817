//! Voice dictation
//!
//! A dictation source delivers incremental recognition results into the
//! runtime's event channel. Platforms without a recognizer get `NoDictation`.

use crate::config::CommandSpec;
use crate::state_machine::Event;
use serde::Deserialize;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One recognition hypothesis
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
}

impl RecognitionResult {
    #[allow(dead_code)] // Used by tests and recognizer fixtures
    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }

    #[allow(dead_code)] // Used by tests and recognizer fixtures
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }
}

/// One incremental update from a continuous recognition stream
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionEvent {
    #[serde(default)]
    pub result_index: usize,
    pub results: Vec<RecognitionResult>,
}

/// Draft text for a recognition update.
///
/// Considers results from `result_index` onward; final text comes before
/// interim text, so finalized words stay put while the interim tail is
/// replaced wholesale on every update.
pub fn compose_transcript(result_index: usize, results: &[RecognitionResult]) -> String {
    let mut final_text = String::new();
    let mut interim_text = String::new();
    for result in results.iter().skip(result_index) {
        if result.is_final {
            final_text.push_str(&result.transcript);
        } else {
            interim_text.push_str(&result.transcript);
        }
    }
    final_text + &interim_text
}

#[derive(Debug, Error)]
pub enum DictationError {
    #[error("Speech recognition is not available")]
    Unavailable,
    #[error("Failed to start recognizer: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Recognizer has no output stream")]
    NoOutput,
}

/// A continuous, interim-results-enabled recognition stream
pub trait DictationSource: Send + Sync {
    /// Start streaming `DictationResult` events, then `DictationEnded` when
    /// the stream finishes on its own.
    fn start(&self, events: mpsc::Sender<Event>) -> Result<(), DictationError>;

    /// Stop the stream. No `DictationEnded` is sent for an explicit stop.
    fn stop(&self);
}

impl<T: DictationSource + ?Sized> DictationSource for Box<T> {
    fn start(&self, events: mpsc::Sender<Event>) -> Result<(), DictationError> {
        (**self).start(events)
    }

    fn stop(&self) {
        (**self).stop();
    }
}

/// Dictation for platforms without a recognizer
#[derive(Default)]
pub struct NoDictation {
    warned: AtomicBool,
}

impl DictationSource for NoDictation {
    fn start(&self, _events: mpsc::Sender<Event>) -> Result<(), DictationError> {
        if !self.warned.swap(true, Ordering::Relaxed) {
            tracing::warn!("Speech recognition is not supported on this platform");
        }
        Err(DictationError::Unavailable)
    }

    fn stop(&self) {}
}

/// Runs an external recognizer that prints one JSON `RecognitionEvent` per line
pub struct CommandDictation {
    command: CommandSpec,
    lang: String,
    active: Mutex<Option<CancellationToken>>,
}

impl CommandDictation {
    pub fn new(command: CommandSpec, lang: impl Into<String>) -> Self {
        Self {
            command,
            lang: lang.into(),
            active: Mutex::new(None),
        }
    }

    fn replace_active(&self, token: Option<CancellationToken>) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(previous) = std::mem::replace(&mut *active, token) {
                previous.cancel();
            }
        }
    }
}

impl DictationSource for CommandDictation {
    fn start(&self, events: mpsc::Sender<Event>) -> Result<(), DictationError> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .env("MICHAI_LANG", &self.lang)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let stdout = child.stdout.take().ok_or(DictationError::NoOutput)?;

        let token = CancellationToken::new();
        self.replace_active(Some(token.clone()));
        tracing::info!(program = %self.command.program, lang = %self.lang, "Dictation started");

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    line = lines.next_line() => match line {
                        Ok(Some(line)) if line.trim().is_empty() => {}
                        Ok(Some(line)) => match serde_json::from_str::<RecognitionEvent>(&line) {
                            Ok(update) => {
                                let event = Event::DictationResult {
                                    result_index: update.result_index,
                                    results: update.results,
                                };
                                if events.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::debug!(error = %e, "Skipping malformed recognizer line"),
                        },
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!(error = %e, "Recognizer output failed");
                            break;
                        }
                    },
                }
            }

            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "Recognizer already exited");
            }
            if !token.is_cancelled() {
                tracing::info!("Dictation stream ended");
                let _ = events.send(Event::DictationEnded).await;
            }
        });

        Ok(())
    }

    fn stop(&self) {
        self.replace_active(None);
        tracing::info!("Dictation stopped");
    }
}
