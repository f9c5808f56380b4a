//! Interactive question loop.
//!
//! Reads one line per turn, classifies it, and dispatches questions to the
//! active mode. Handler errors are reported and the loop keeps going; exit
//! keywords, end of input, and Ctrl-C all end it with a farewell.

use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Classified user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Whitespace-only line; re-prompt without dispatching.
    Blank,
    /// `exit` / `quit`, any case.
    Exit,
    /// Anything else: a question for the active mode.
    Question(String),
}

/// Classify one line of user input.
pub fn classify(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Command::Blank
    } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        Command::Exit
    } else {
        Command::Question(trimmed.to_string())
    }
}

/// One active application mode, as seen by the loop.
#[async_trait]
pub trait Handler {
    /// Answer one question, printing output in the mode's format.
    async fn handle(&mut self, question: &str) -> Result<()>;
}

/// Run the question loop: read from `input`, write loop-level messages to
/// `out`, dispatch questions to `handler`.
///
/// A handler error is printed as `Error: {message}` and the loop continues;
/// it only ends on an exit keyword, end of input, or Ctrl-C.
pub async fn run<R, W, H>(input: R, mut out: W, handler: &mut H) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    H: Handler + ?Sized,
{
    let mut lines = input.lines();

    loop {
        write!(out, "\nYou: ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                writeln!(out, "\nGoodbye!")?;
                return Ok(());
            }
        };

        let Some(line) = line else {
            // End of input behaves like an exit command.
            writeln!(out, "\nGoodbye!")?;
            return Ok(());
        };

        match classify(&line) {
            Command::Blank => continue,
            Command::Exit => {
                writeln!(out, "Goodbye!")?;
                return Ok(());
            }
            Command::Question(question) => {
                let interrupted = tokio::select! {
                    result = handler.handle(&question) => {
                        if let Err(e) = result {
                            writeln!(out, "Error: {e:#}")?;
                        }
                        false
                    }
                    _ = tokio::signal::ctrl_c() => true,
                };
                if interrupted {
                    writeln!(out, "\nGoodbye!")?;
                    return Ok(());
                }
            }
        }
    }
}
