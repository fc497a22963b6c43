//! Interactive chat loop
//!
//! Reads one line at a time from stdin. While an exchange runs no input is
//! read; surface messages are rendered as they arrive instead.

use std::future::Future;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use qa_chat_core::{copy_turn, ExchangeController, QaTransport, SurfaceMessage};

use crate::clipboard::SystemClipboard;
use crate::command::{Command, HELP};
use crate::render::{format_history, needs_welcome, Renderer, WELCOME};

const PROMPT: &str = "you> ";

/// Terminal output for one chat
struct Surface {
    renderer: Renderer,
    out: io::Stdout,
}

impl Surface {
    fn new() -> Self {
        Self {
            renderer: Renderer::new(),
            out: io::stdout(),
        }
    }

    fn show(&mut self, msg: &SurfaceMessage) -> io::Result<()> {
        if let Some(text) = self.renderer.render(msg) {
            self.out.write_all(text.as_bytes())?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{PROMPT}")?;
        self.out.flush()
    }
}

/// Run `exchange` to completion while rendering its updates
///
/// Returns `None` if interrupted with Ctrl-C; the exchange is dropped.
async fn drive<F: Future>(
    exchange: F,
    updates: &mut UnboundedReceiver<SurfaceMessage>,
    surface: &mut Surface,
) -> Result<Option<F::Output>> {
    tokio::pin!(exchange);

    let outcome = loop {
        tokio::select! {
            biased;
            Some(msg) = updates.recv() => surface.show(&msg)?,
            result = &mut exchange => break Some(result),
            _ = tokio::signal::ctrl_c() => break None,
        }
    };

    // messages emitted in the final poll
    while let Ok(msg) = updates.try_recv() {
        surface.show(&msg)?;
    }

    Ok(outcome)
}

/// Run the chat until `/quit`, end of input or Ctrl-C
pub async fn run<T: QaTransport + ?Sized>(
    controller: ExchangeController<T>,
    mut updates: UnboundedReceiver<SurfaceMessage>,
) -> Result<()> {
    let session = controller.session().clone();
    let mut surface = Surface::new();
    let mut clipboard = SystemClipboard::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if needs_welcome(&session.turns()) {
        surface.notice(WELCOME)?;
    }

    loop {
        surface.prompt()?;
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            surface.notice("")?;
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Ask(text) => {
                match drive(controller.send(&text), &mut updates, &mut surface).await? {
                    None => break,
                    // transport failures were already rendered from ExchangeFailed
                    Some(Err(e)) if !e.is_transport_failure() => surface.notice(&e.to_string())?,
                    Some(_) => {}
                }
            }
            Command::Regenerate => {
                match drive(controller.regenerate(), &mut updates, &mut surface).await? {
                    None => break,
                    Some(Ok(None)) => surface
                        .notice("Nothing to regenerate: the conversation does not end in an answer.")?,
                    Some(Err(e)) if !e.is_transport_failure() => surface.notice(&e.to_string())?,
                    Some(_) => {}
                }
            }
            Command::Copy(number) => {
                let index = number
                    .map(|n| n - 1)
                    .or_else(|| session.last_assistant_index());
                let Some(index) = index else {
                    surface.notice("No answer to copy yet.")?;
                    continue;
                };
                match copy_turn(&session, index, &mut clipboard) {
                    Ok(bytes) => {
                        debug!(index, bytes, "copied");
                        surface.notice(&format!("Copied turn {} to the clipboard.", index + 1))?;
                    }
                    Err(e) => surface.notice(&format!("Copy failed: {e}"))?,
                }
            }
            Command::History => {
                let history = format_history(&session.turns());
                surface.notice(history.trim_end())?;
            }
            Command::Help => surface.notice(HELP)?,
            Command::Invalid(reason) => surface.notice(&reason)?,
            Command::Quit => break,
        }
    }

    info!(turns = session.len(), "Chat ended");
    Ok(())
}
