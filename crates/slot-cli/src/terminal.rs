//! Terminal adapters for the game loop

use std::io::{BufRead, Write};

use slot_core::{GameEvent, InputProvider, OutputSink, SessionSummary, SpinOutcome};

/// Prompts on a writer, reads answers line by line
pub struct TerminalInput<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> InputProvider for TerminalInput<R, W> {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.writer, "{prompt} ").and_then(|_| self.writer.flush()) {
            log::warn!("failed to write prompt: {e}");
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::error!("failed to read input: {e}");
                None
            }
        }
    }
}

/// Prints game events as plain text
pub struct TerminalSink<W: Write> {
    writer: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn emit(&mut self, event: &GameEvent) {
        if let Err(e) = self.writer.write_all(render(event).as_bytes()) {
            log::warn!("failed to write output: {e}");
        }
    }
}

/// Text for one event, newline-terminated
pub fn render(event: &GameEvent) -> String {
    match event {
        GameEvent::Balance(balance) => format!("Current balance is ${balance}\n"),
        GameEvent::Notice(message) => format!("{message}\n"),
        GameEvent::BetPlaced(bet) => format!(
            "You are betting ${} on {} lines. Total bet is equal to: ${}\n",
            bet.per_line,
            bet.lines,
            bet.total_stake()
        ),
        GameEvent::Spun(outcome) => render_spin(outcome),
        GameEvent::Summary(summary) => render_summary(summary),
    }
}

fn render_spin(outcome: &SpinOutcome) -> String {
    let mut out = format!("\n{}\n", outcome.grid);
    if outcome.is_win() {
        let lines: Vec<String> = outcome.winning_lines.iter().map(u32::to_string).collect();
        out.push_str(&format!(
            "You have won ${} on lines: [{}].\n",
            outcome.winnings,
            lines.join(", ")
        ));
    } else {
        out.push_str("You did not win!\n");
    }
    out
}

fn render_summary(summary: &SessionSummary) -> String {
    let verdict = if summary.is_win() { "won" } else { "lost" };
    let mut out = format!(
        "You left with ${}. You {verdict} ${}\n",
        summary.final_balance,
        summary.net_result().unsigned_abs()
    );
    let stats = &summary.stats;
    if stats.total_spins > 0 {
        out.push_str(&format!(
            "{} spin(s), hit rate {:.1}%, RTP {:.1}%, biggest win ${}\n",
            stats.total_spins,
            stats.hit_rate(),
            stats.rtp(),
            stats.biggest_win
        ));
    }
    out
}
