//! Feeds JSON-lines observations through a session and prints the actions.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use lux_agent_system_planner::Session;
use lux_agent_world::Observation;

/// Plans one turn per non-blank input line and writes its actions comma-separated.
///
/// Returns the number of turns planned. A turn without actions prints an
/// empty line so output lines stay aligned with input turns.
pub(crate) fn run<R, W>(session: &mut Session, input: R, mut output: W) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut turns = 0;
    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("failed to read observation line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let observation: Observation = serde_json::from_str(&line)
            .with_context(|| format!("failed to parse observation on line {line_number}"))?;
        session
            .observe(&observation)
            .with_context(|| format!("failed to apply observation on line {line_number}"))?;
        let plan = session
            .play_turn()
            .with_context(|| format!("failed to plan turn {}", observation.turn))?;

        let rendered: Vec<String> = plan.actions.iter().map(ToString::to_string).collect();
        writeln!(output, "{}", rendered.join(",")).context("failed to write actions")?;
        turns += 1;
    }

    output.flush().context("failed to flush actions")?;
    Ok(turns)
}
