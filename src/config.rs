//! Runtime configuration from environment variables

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LANG: &str = "en-US";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or API_KEY) environment variable not set")]
    MissingApiKey,
}

/// An external program and its leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Split a whitespace separated command line. Blank input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(String::from);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }
}

/// Configuration for the chat client
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    /// Alternate API base URL (proxy or gateway)
    pub gateway: Option<String>,
    pub tts_command: Option<CommandSpec>,
    pub stt_command: Option<CommandSpec>,
    pub lang: String,
}

impl ChatConfig {
    /// Read configuration; fails when no credential is provided
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            model: non_blank("MICHAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gateway: non_blank("MICHAI_GATEWAY"),
            tts_command: non_blank("MICHAI_TTS_COMMAND").and_then(|c| CommandSpec::parse(&c)),
            stt_command: non_blank("MICHAI_STT_COMMAND").and_then(|c| CommandSpec::parse(&c)),
            lang: non_blank("MICHAI_LANG").unwrap_or_else(|| DEFAULT_LANG.to_string()),
        })
    }
}
