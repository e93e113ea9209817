//! Line-oriented terminal front end
//!
//! Reads commands from stdin and turns them into controller events; renders
//! `UiEvent`s to stdout.

use crate::runtime::{ChatHandle, UiEvent};
use crate::state_machine::{ChatState, Event};
use crate::transcript::{Message, Sender};
use crossterm::style::Stylize;
use std::fmt::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

/// Emoji palette, in display order
pub const EMOJIS: [&str; 20] = [
    "😀", "😂", "❤️", "👍", "🤔", "🎉", "🤯", "🙏", "🔥", "👋", "😊", "😍", "😭", "😎", "😮", "😴",
    "🙄", "💯", "🚀", "✨",
];

const HELP: &str = "Commands: /send  /image <path>  /unimage  /emoji [n]  /mic  /draft <text>  /quit";

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Plain text: joined onto the draft and submitted
    Say(String),
    /// Blank line or `/send`: submit the current draft
    Send,
    Draft(String),
    AttachImage(PathBuf),
    RemoveImage,
    ToggleEmojiPicker,
    /// 1-based palette position
    InsertEmoji(usize),
    ToggleMic,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Send;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Say(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(name, arg)| (name, arg.trim()));

    match (name, arg) {
        ("send", "") => Command::Send,
        ("draft", text) => Command::Draft(text.to_string()),
        ("image", path) if !path.is_empty() => Command::AttachImage(PathBuf::from(path)),
        ("unimage", "") => Command::RemoveImage,
        ("emoji", "") => Command::ToggleEmojiPicker,
        ("emoji", n) => match n.parse() {
            Ok(n) if (1..=EMOJIS.len()).contains(&n) => Command::InsertEmoji(n),
            _ => Command::Unknown(trimmed.to_string()),
        },
        ("mic", "") => Command::ToggleMic,
        ("help", "") => Command::Help,
        ("quit" | "exit", "") => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

impl Command {
    /// Controller events for this command
    pub fn into_events(self) -> Vec<Event> {
        match self {
            Command::Say(text) => vec![Event::SubmitText { text }],
            Command::Send => vec![Event::Submit],
            Command::Draft(text) => vec![Event::EditDraft { text }],
            Command::AttachImage(path) => vec![Event::AttachImage { path }],
            Command::RemoveImage => vec![Event::RemoveImage],
            Command::ToggleEmojiPicker => vec![Event::ToggleEmojiPicker],
            Command::InsertEmoji(n) => EMOJIS
                .get(n.wrapping_sub(1))
                .map(|glyph| {
                    vec![Event::InsertEmoji {
                        glyph: (*glyph).to_string(),
                    }]
                })
                .unwrap_or_default(),
            Command::ToggleMic => vec![Event::ToggleDictation],
            Command::Help | Command::Quit | Command::Unknown(_) => vec![],
        }
    }
}

fn palette() -> String {
    let mut out = String::from("  ");
    for (i, glyph) in EMOJIS.iter().enumerate() {
        let _ = write!(out, "{} {glyph}  ", i + 1);
        if i % 10 == 9 && i + 1 < EMOJIS.len() {
            out.push_str("\n  ");
        }
    }
    out.trim_end().to_string()
}

fn render_message(message: &Message) -> String {
    let mut body = message.text.clone();
    if message.image_url.is_some() {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push_str("[image]");
    }
    match message.sender {
        Sender::User => format!("{} {body}", "you:".green().bold()),
        Sender::Michai => format!("{} {body}", "michai:".cyan().bold()),
    }
}

/// Turns UI events into printable lines, remembering the last state seen
#[derive(Default)]
pub struct TerminalView {
    last: ChatState,
}

impl TerminalView {
    pub fn render(&mut self, event: &UiEvent) -> Vec<String> {
        match event {
            UiEvent::MessageAppended(message) => vec![render_message(message)],
            UiEvent::Rejected { reason } => vec![format!("{} {reason}", "!".yellow().bold())],
            UiEvent::StateChanged(state) => {
                let previous = std::mem::replace(&mut self.last, state.clone());
                Self::render_state_change(&previous, state)
            }
        }
    }

    fn render_state_change(old: &ChatState, new: &ChatState) -> Vec<String> {
        let mut lines = Vec::new();

        if new.is_in_flight() && !old.is_in_flight() {
            lines.push("Michai is typing...".dark_grey().italic().to_string());
        }
        if new.listening != old.listening {
            let notice = if new.listening {
                "Listening... (/mic to stop)"
            } else {
                "Stopped listening."
            };
            lines.push(notice.magenta().to_string());
        }
        if new.listening && new.draft.text != old.draft.text {
            lines.push(format!("  {}", new.draft.text.as_str().dark_grey()));
        }
        if new.emoji_picker_open && !old.emoji_picker_open {
            lines.push(palette());
        }
        if new.draft.image.is_some() && new.draft.image != old.draft.image {
            lines.push("Image attached. (/unimage to remove)".blue().to_string());
        }

        lines
    }
}

/// Print the banner
pub fn print_banner() {
    println!("{}", "Michai Friend".cyan().bold());
    println!("Your friendly AI companion");
    println!("{}", "Press Enter to chat".dark_grey());
    println!("{}", HELP.dark_grey());
    println!();
}

/// Next input line without its terminator; invalid UTF-8 is replaced, not fatal
async fn read_line_lossy<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Run the terminal until stdin closes or the user quits
pub async fn run(handle: &ChatHandle, mut updates: broadcast::Receiver<UiEvent>) {
    print_banner();

    let render_task = tokio::spawn(async move {
        let mut view = TerminalView::default();
        loop {
            match updates.recv().await {
                Ok(event) => {
                    for line in view.render(&event) {
                        println!("{line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Terminal fell behind chat updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut input = BufReader::new(tokio::io::stdin());
    loop {
        let line = match read_line_lossy(&mut input).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input, closing the chat");
                break;
            }
        };
        let command = parse_command(&line);
        match &command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP.dark_grey()),
            Command::Unknown(text) => {
                println!("{} Unknown command: {text}", "!".yellow().bold());
                println!("{}", HELP.dark_grey());
            }
            Command::RemoveImage => println!("{}", "Image removed.".blue()),
            _ => {}
        }

        for event in command.into_events() {
            if let Err(e) = handle.send(event).await {
                tracing::error!(error = %e, "Chat runtime is gone");
                render_task.abort();
                return;
            }
        }
    }

    render_task.abort();
}
