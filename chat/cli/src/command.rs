//! Input line parsing
//!
//! Lines starting with `/` are commands; anything else is a question.

/// One parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Ask a question
    Ask(String),
    /// Regenerate the latest answer
    Regenerate,
    /// Copy a turn (1-based), or the latest answer when `None`
    Copy(Option<usize>),
    /// Print the conversation so far
    History,
    /// Print the command list
    Help,
    /// Leave the chat
    Quit,
    /// Blank line
    Empty,
    /// Unrecognised command or bad argument
    Invalid(String),
}

/// Help text for `/help`
pub const HELP: &str = "\
Commands:
  /regen        regenerate the latest answer
  /copy [n]     copy turn n to the clipboard (default: latest answer)
  /history      list the conversation so far
  /help         show this help
  /quit         leave the chat
Anything else is sent as a question.";

impl Command {
    /// Parse one line of input
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Self::Ask(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        if parts.next().is_some() {
            return Self::Invalid(format!("too many arguments for /{name}"));
        }

        match (name, arg) {
            ("regen" | "regenerate", None) => Self::Regenerate,
            ("copy", None) => Self::Copy(None),
            ("copy", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Self::Copy(Some(n)),
                _ => Self::Invalid(format!("/copy expects a turn number, got {n:?}")),
            },
            ("history", None) => Self::History,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("regen" | "regenerate" | "history" | "help" | "?" | "quit" | "exit", Some(_)) => {
                Self::Invalid(format!("/{name} takes no arguments"))
            }
            _ => Self::Invalid(format!("unknown command /{name}, try /help")),
        }
    }
}
