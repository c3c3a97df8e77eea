use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::completion::CompletionTransport;
use crate::config::ErrorPolicy;
use crate::session::Session;
use crate::transcript::Message;

pub const PROMPT: &str = "Ask a question: ";
pub const EXIT_SENTINEL: &str = "exit";
const HISTORY_COMMAND: &str = "/history";

pub async fn run_repl<T, R, W>(
    session: &mut Session<T>,
    mut input: R,
    output: &mut W,
    policy: ErrorPolicy,
) -> Result<()>
where
    T: CompletionTransport,
    R: BufRead,
    W: Write,
{
    let mut turns = 0usize;

    loop {
        write!(output, "{PROMPT}").context("Failed to write prompt")?;
        output.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("Failed to read stdin")?;
        if read == 0 {
            break;
        }

        let question = line.trim();
        if question == EXIT_SENTINEL {
            break;
        }
        if question.is_empty() {
            continue;
        }
        if question == HISTORY_COMMAND {
            print_history(output, session.transcript().messages())?;
            continue;
        }

        match session.submit_turn(question).await {
            Ok(answer) => {
                turns += 1;
                writeln!(output, "{answer}").context("Failed to write answer")?;
            }
            Err(err) => match policy {
                ErrorPolicy::Fatal => return Err(err).context("Turn failed"),
                ErrorPolicy::Continue => {
                    warn!(error = %err, "turn failed; continuing");
                    writeln!(output, "error: {err}").context("Failed to write error")?;
                }
            },
        }
    }

    info!(
        turns,
        transcript_len = session.transcript().len(),
        "conversation ended"
    );
    Ok(())
}

fn print_history<W: Write>(output: &mut W, history: &[Message]) -> Result<()> {
    if history.is_empty() {
        writeln!(output, "(history is empty)")?;
        return Ok(());
    }

    for (idx, msg) in history.iter().enumerate() {
        writeln!(output, "[{}] {}: {}", idx, msg.role.as_str(), msg.content)?;
    }
    Ok(())
}
