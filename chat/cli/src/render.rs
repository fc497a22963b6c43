//! Line-oriented rendering of surface messages
//!
//! Stream buffer updates carry the running total, so only the part not yet
//! printed is written. Everything else is short status text.

use qa_chat_core::{Role, SurfaceMessage, Turn};

/// Shown when a conversation has no questions yet
pub const WELCOME: &str = "\
Ask a question about ACS skills assessment. Type /help for commands.
History is kept for this session only and is gone when you quit.";

/// Shown while waiting for the first fragment
const THINKING: &str = "(thinking...)";

/// Prefix printed before a streamed answer
const ANSWER_PREFIX: &str = "assistant> ";

/// Turns surface messages into terminal output
#[derive(Debug, Default)]
pub struct Renderer {
    /// Bytes of the current stream buffer already printed
    printed: usize,
}

impl Renderer {
    /// Create a renderer with nothing printed
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to write for `msg`, if any
    pub fn render(&mut self, msg: &SurfaceMessage) -> Option<String> {
        match msg {
            msg if msg.is_buffer_cleared() => {
                let was_streaming = self.printed > 0;
                self.printed = 0;
                was_streaming.then(|| "\n".to_string())
            }
            SurfaceMessage::StreamBuffer { content } => {
                let out = match content.get(self.printed..) {
                    Some(suffix) if self.printed > 0 => suffix.to_string(),
                    Some(suffix) => format!("{ANSWER_PREFIX}{suffix}"),
                    // buffer no longer extends what was printed; start over
                    None => format!("\n{ANSWER_PREFIX}{content}"),
                };
                self.printed = content.len();
                Some(out)
            }
            SurfaceMessage::TurnAppended { turn, .. }
                if turn.role() == Role::Assistant && turn.content().is_empty() =>
            {
                Some(format!("{ANSWER_PREFIX}(empty answer)\n"))
            }
            SurfaceMessage::TurnRemoved { .. } => Some("(regenerating the last answer)\n".into()),
            SurfaceMessage::ExchangeFailed { error } => Some(format!(
                "! {error}\n! Your question was kept but has no answer.\n"
            )),
            SurfaceMessage::Busy { busy: true } => Some(format!("{THINKING}\n")),
            SurfaceMessage::TurnAppended { .. } | SurfaceMessage::Busy { busy: false } => None,
        }
    }
}

/// Format the log for `/history`, numbering turns from 1
pub fn format_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "(no turns yet)\n".to_string();
    }

    let mut out = String::new();
    for (i, turn) in turns.iter().enumerate() {
        out.push_str(&format!("[{}] {}: {}\n", i + 1, turn.role(), turn.content()));
    }
    out
}

/// Whether the welcome notice applies
pub fn needs_welcome(turns: &[Turn]) -> bool {
    turns.iter().all(|turn| turn.role() == Role::System)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer(content: &str) -> SurfaceMessage {
        SurfaceMessage::StreamBuffer {
            content: content.to_string(),
        }
    }

    fn render_all(renderer: &mut Renderer, messages: &[SurfaceMessage]) -> String {
        messages
            .iter()
            .filter_map(|msg| renderer.render(msg))
            .collect()
    }

    #[test]
    fn test_prints_only_new_suffix() {
        let mut renderer = Renderer::new();
        let out = render_all(
            &mut renderer,
            &[
                SurfaceMessage::TurnAppended {
                    index: 0,
                    turn: Turn::user("Hello"),
                },
                SurfaceMessage::Busy { busy: true },
                buffer(""),
                buffer("Hi"),
                buffer("Hi there"),
                SurfaceMessage::TurnAppended {
                    index: 1,
                    turn: Turn::assistant("Hi there"),
                },
                buffer(""),
                SurfaceMessage::Busy { busy: false },
            ],
        );

        assert_eq!(out, "(thinking...)\nassistant> Hi there\n");
    }

    #[test]
    fn test_multibyte_suffix() {
        let mut renderer = Renderer::new();
        assert_eq!(renderer.render(&buffer("Grü")).as_deref(), Some("assistant> Grü"));
        assert_eq!(renderer.render(&buffer("Grüß 👋")).as_deref(), Some("ß 👋"));
    }

    #[test]
    fn test_failure_notice() {
        let mut renderer = Renderer::new();
        let out = render_all(
            &mut renderer,
            &[
                buffer("partial"),
                buffer(""),
                SurfaceMessage::ExchangeFailed {
                    error: "Network or decode failure: reset".to_string(),
                },
            ],
        );

        assert!(out.starts_with("assistant> partial\n! Network or decode failure: reset\n"));
        assert!(out.contains("no answer"));
    }

    #[test]
    fn test_empty_answer_and_regenerate() {
        let mut renderer = Renderer::new();
        assert_eq!(
            renderer.render(&SurfaceMessage::TurnRemoved { index: 1 }).as_deref(),
            Some("(regenerating the last answer)\n")
        );
        assert_eq!(
            renderer
                .render(&SurfaceMessage::TurnAppended {
                    index: 1,
                    turn: Turn::assistant(""),
                })
                .as_deref(),
            Some("assistant> (empty answer)\n")
        );
        assert_eq!(renderer.render(&buffer("")), None);
    }

    #[test]
    fn test_format_history() {
        let turns = vec![Turn::user("Q1"), Turn::assistant("A1")];
        assert_eq!(format_history(&turns), "[1] user: Q1\n[2] assistant: A1\n");
        assert_eq!(format_history(&[]), "(no turns yet)\n");
    }

    #[test]
    fn test_needs_welcome() {
        assert!(needs_welcome(&[]));
        assert!(needs_welcome(&[Turn::system("be brief")]));
        assert!(!needs_welcome(&[Turn::user("Q1")]));
    }
}
