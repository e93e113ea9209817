//! Voice playback
//!
//! At most one utterance plays at a time; the runtime cancels before every
//! `speak`.

use crate::config::CommandSpec;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::process::{Child, Command};

/// Fire-and-forget, cancellable text-to-speech
pub trait SpeechSink: Send + Sync {
    /// Stop the current utterance, if any
    fn cancel(&self);

    /// Start speaking `text`
    fn speak(&self, text: &str);
}

impl<T: SpeechSink + ?Sized> SpeechSink for Box<T> {
    fn cancel(&self) {
        (**self).cancel();
    }

    fn speak(&self, text: &str) {
        (**self).speak(text);
    }
}

/// Speech for platforms without a synthesizer
#[derive(Default)]
pub struct NoSpeech {
    warned: AtomicBool,
}

impl SpeechSink for NoSpeech {
    fn cancel(&self) {}

    fn speak(&self, _text: &str) {
        if !self.warned.swap(true, Ordering::Relaxed) {
            tracing::warn!("Text-to-speech is not supported on this platform");
        }
    }
}

/// Speaks through an external command such as `espeak` or `say`.
///
/// The text is passed as the final argument.
pub struct CommandSpeech {
    command: CommandSpec,
    current: Mutex<Option<Child>>,
}

impl CommandSpeech {
    pub fn new(command: CommandSpec) -> Self {
        Self {
            command,
            current: Mutex::new(None),
        }
    }
}

impl SpeechSink for CommandSpeech {
    fn cancel(&self) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        if let Some(mut child) = current.take() {
            // Already-finished utterances report an error here; nothing to do.
            let _ = child.start_kill();
        }
    }

    fn speak(&self, text: &str) {
        let spawned = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                if let Ok(mut current) = self.current.lock() {
                    if let Some(mut previous) = current.replace(child) {
                        let _ = previous.start_kill();
                    }
                }
            }
            Err(e) => {
                tracing::warn!(program = %self.command.program, error = %e, "Failed to start speech");
            }
        }
    }
}
