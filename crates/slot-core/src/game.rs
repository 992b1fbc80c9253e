//! Game loop — deposit, spin, rebet, re-deposit, quit
//!
//! ## State machine
//!
//! ```text
//! AwaitingDeposit ──deposit──> Idle ──play──> Spinning ──affordable──> Rebetting
//!                               ^ │                │                     │  │
//!                               │ └─deposit─┐      │ below min stake     │  └─y─> Spinning
//!                               └───────────┘      v                     │
//!                                              Depositing <──────────────┘ (n, broke)
//!                                                  │ q / input closed
//!                                                  v
//!                                              Terminated
//! ```
//!
//! Terminal I/O sits behind [`InputProvider`] and [`OutputSink`]; every
//! re-prompt is a plain loop with no retry cap.

use std::collections::VecDeque;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::grid::GridSource;
use crate::ledger::BalanceLedger;
use crate::spin::{Bet, SessionStats, SpinOutcome, SpinSession};

/// Source of raw player responses
pub trait InputProvider {
    /// Show `prompt` and return the response, or `None` once input is closed
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Receiver of everything the player should see
pub trait OutputSink {
    fn emit(&mut self, event: &GameEvent);
}

/// Player-facing output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// Current balance
    Balance(u64),
    /// Explanation for a re-prompt or refused action
    Notice(String),
    /// Stake about to be played
    BetPlaced(Bet),
    /// Settled spin, including the grid
    Spun(SpinOutcome),
    /// Final accounting
    Summary(SessionSummary),
}

/// Loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitingDeposit,
    Idle,
    Spinning(Bet),
    Rebetting(Bet),
    /// Balance cannot cover the minimum stake; carries the last bet
    Depositing(Option<Bet>),
    Terminated,
}

/// End-of-session accounting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_balance: u64,
    pub total_deposited: u64,
    pub stats: SessionStats,
}

impl SessionSummary {
    /// Balance minus deposits
    pub fn net_result(&self) -> i64 {
        self.final_balance as i64 - self.total_deposited as i64
    }

    /// Break-even counts as a win
    pub fn is_win(&self) -> bool {
        self.final_balance >= self.total_deposited
    }
}

/// Parse a non-negative whole number the way a player types it
pub fn parse_number(raw: &str) -> SlotResult<u64> {
    let s = raw.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SlotError::InvalidInput(format!("not a number: {s:?}")));
    }
    s.parse::<u64>()
        .map_err(|e| SlotError::InvalidInput(format!("{s:?}: {e}")))
}

/// Drives a whole session over an input provider and an output sink
pub struct GameLoop<I: InputProvider, O: OutputSink, G: GridSource> {
    session: SpinSession<G>,
    ledger: Option<BalanceLedger>,
    input: I,
    output: O,
    state: GameState,
}

impl<I: InputProvider, O: OutputSink, G: GridSource> GameLoop<I, O, G> {
    pub fn new(session: SpinSession<G>, input: I, output: O) -> Self {
        Self {
            session,
            ledger: None,
            input,
            output,
            state: GameState::AwaitingDeposit,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn ledger(&self) -> Option<&BalanceLedger> {
        self.ledger.as_ref()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Run until terminated and return the final accounting
    pub fn run(&mut self) -> SlotResult<SessionSummary> {
        while self.state != GameState::Terminated {
            self.step()?;
        }

        let summary = self.summary();
        info!(
            "session over: balance {}, deposited {}, {} spin(s)",
            summary.final_balance, summary.total_deposited, summary.stats.total_spins
        );
        self.output.emit(&GameEvent::Summary(summary.clone()));
        Ok(summary)
    }

    /// Advance one transition
    pub fn step(&mut self) -> SlotResult<GameState> {
        let next = match self.state {
            GameState::AwaitingDeposit => self.await_deposit()?,
            GameState::Idle => self.idle()?,
            GameState::Spinning(bet) => self.spinning(bet)?,
            GameState::Rebetting(bet) => self.rebetting(bet),
            GameState::Depositing(last) => self.depositing(last)?,
            GameState::Terminated => GameState::Terminated,
        };

        if next != self.state {
            debug!("{:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    pub fn summary(&self) -> SessionSummary {
        match &self.ledger {
            Some(ledger) => SessionSummary {
                final_balance: ledger.get(),
                total_deposited: ledger.total_deposited(),
                stats: self.session.stats().clone(),
            },
            None => SessionSummary::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATES
    // ═══════════════════════════════════════════════════════════════════════════

    fn await_deposit(&mut self) -> SlotResult<GameState> {
        Ok(match self.take_deposit()? {
            Some(_) => GameState::Idle,
            None => GameState::Terminated,
        })
    }

    fn idle(&mut self) -> SlotResult<GameState> {
        let Some(balance) = self.ledger.as_ref().map(BalanceLedger::get) else {
            return Ok(GameState::AwaitingDeposit);
        };
        self.output.emit(&GameEvent::Balance(balance));

        let Some(choice) = self
            .input
            .read_line("Press enter to play, d to deposit (q to quit).")
        else {
            return Ok(GameState::Terminated);
        };

        match choice.trim().to_ascii_lowercase().as_str() {
            "q" => Ok(GameState::Terminated),
            "d" => Ok(match self.take_deposit()? {
                Some(_) => GameState::Idle,
                None => GameState::Terminated,
            }),
            _ => self.choose_bet(balance),
        }
    }

    fn spinning(&mut self, bet: Bet) -> SlotResult<GameState> {
        let Some(ledger) = self.ledger.as_mut() else {
            return Ok(GameState::AwaitingDeposit);
        };

        self.output.emit(&GameEvent::BetPlaced(bet));
        match self.session.spin(ledger, bet.lines, bet.per_line) {
            Ok(outcome) => self.output.emit(&GameEvent::Spun(outcome)),
            Err(e) if e.is_recoverable() => {
                self.output.emit(&GameEvent::Notice(e.to_string()));
                return Ok(self.after_spin(bet, false));
            }
            Err(e) => return Err(e),
        }

        Ok(self.after_spin(bet, true))
    }

    fn rebetting(&mut self, bet: Bet) -> GameState {
        let Some(balance) = self.ledger.as_ref().map(BalanceLedger::get) else {
            return GameState::AwaitingDeposit;
        };
        if balance < bet.total_stake() {
            return self.after_spin(bet, false);
        }

        self.output.emit(&GameEvent::Balance(balance));
        let prompt = format!(
            "Would you like to rebet? ${} on {} lines! (Y/N)",
            bet.per_line, bet.lines
        );
        match self.input.read_line(&prompt) {
            None => GameState::Terminated,
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => GameState::Spinning(bet),
            Some(_) => self.after_spin(bet, false),
        }
    }

    fn depositing(&mut self, last: Option<Bet>) -> SlotResult<GameState> {
        let Some(balance) = self.ledger.as_ref().map(BalanceLedger::get) else {
            return Ok(GameState::AwaitingDeposit);
        };
        self.output.emit(&GameEvent::Balance(balance));

        match self.input.read_line("Please deposit more to play! q to quit!") {
            None => return Ok(GameState::Terminated),
            Some(answer) if answer.trim() == "q" => return Ok(GameState::Terminated),
            Some(_) => {}
        }

        if self.take_deposit()?.is_none() {
            return Ok(GameState::Terminated);
        }

        let min_stake = self.session.config().min_stake();
        let Some(ledger) = self.ledger.as_ref() else {
            return Ok(GameState::AwaitingDeposit);
        };
        Ok(match last {
            Some(bet) if ledger.can_afford(bet.total_stake()) => GameState::Rebetting(bet),
            _ if !ledger.can_afford(min_stake) => GameState::Depositing(last),
            _ => GameState::Idle,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // HELPERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Branch taken once a spin (or a declined rebet) is done
    fn after_spin(&self, bet: Bet, offer_rebet: bool) -> GameState {
        let Some(ledger) = self.ledger.as_ref() else {
            return GameState::AwaitingDeposit;
        };
        if offer_rebet && ledger.can_afford(bet.total_stake()) {
            GameState::Rebetting(bet)
        } else if !ledger.can_afford(self.session.config().min_stake()) {
            GameState::Depositing(Some(bet))
        } else {
            GameState::Idle
        }
    }

    fn deposit(&mut self, amount: u64) -> SlotResult<u64> {
        match self.ledger.as_mut() {
            Some(ledger) => ledger.deposit(amount),
            None => {
                let ledger = BalanceLedger::open(amount)?;
                let balance = ledger.get();
                self.ledger = Some(ledger);
                Ok(balance)
            }
        }
    }

    fn notice(&mut self, message: impl Into<String>) {
        self.output.emit(&GameEvent::Notice(message.into()));
    }

    /// Prompt until a deposit lands; `None` once input is closed
    fn take_deposit(&mut self) -> SlotResult<Option<u64>> {
        loop {
            let Some(raw) = self.input.read_line("What would you like to deposit? $") else {
                return Ok(None);
            };
            let amount = match parse_number(&raw) {
                Ok(amount) if amount > 0 => amount,
                _ => {
                    self.notice("Please enter a number greater than 0.");
                    continue;
                }
            };
            match self.deposit(amount) {
                Ok(balance) => return Ok(Some(balance)),
                Err(e) if e.is_recoverable() => self.notice(e.to_string()),
                Err(e) => return Err(e),
            }
        }
    }

    fn choose_bet(&mut self, balance: u64) -> SlotResult<GameState> {
        let config = self.session.config().clone();
        if balance < config.min_stake() {
            self.notice(format!(
                "Your balance of ${balance} is below the minimum bet of ${}.",
                config.min_stake()
            ));
            return Ok(GameState::Idle);
        }

        let lines = loop {
            let prompt = format!("Enter number of lines to bet on (1-{})?", config.max_lines);
            let Some(raw) = self.input.read_line(&prompt) else {
                return Ok(GameState::Terminated);
            };
            match parse_number(&raw) {
                Ok(n) if config.lines_in_range(n.min(u32::MAX as u64) as u32) => {
                    let lines = n as u32;
                    if lines as u64 * config.min_bet > balance {
                        self.notice(format!(
                            "Your balance of ${balance} cannot cover {lines} lines at ${} each.",
                            config.min_bet
                        ));
                        continue;
                    }
                    break lines;
                }
                _ => self.notice("Please enter a valid number of lines!"),
            }
        };

        let per_line = loop {
            let Some(raw) = self
                .input
                .read_line("What would you like to bet on each line? $")
            else {
                return Ok(GameState::Terminated);
            };
            match parse_number(&raw) {
                Ok(amount) if config.bet_in_range(amount) => {
                    if lines as u64 * amount > balance {
                        self.notice(format!(
                            "You do not have enough to bet that amount, your current balance is ${balance}."
                        ));
                        continue;
                    }
                    break amount;
                }
                _ => self.notice(format!(
                    "Amount must be between ${} - ${}!",
                    config.min_bet, config.max_bet
                )),
            }
        };

        let Some(ledger) = self.ledger.as_ref() else {
            return Ok(GameState::AwaitingDeposit);
        };
        match self.session.validate_bet(ledger, lines, per_line) {
            Ok(bet) => Ok(GameState::Spinning(bet)),
            Err(e) if e.is_recoverable() => {
                self.notice(e.to_string());
                Ok(GameState::Idle)
            }
            Err(e) => Err(e),
        }
    }
}

/// Input replayed from a fixed script; closed once the script runs out
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl InputProvider for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front()
    }
}

/// Keeps every emitted event
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<GameEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Notice(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn spins(&self) -> Vec<&SpinOutcome> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Spun(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }
}

impl OutputSink for RecordingSink {
    fn emit(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::grid::{FixedGridSource, Grid};
    use crate::ledger::MAX_BALANCE;
    use crate::symbols::Symbol::*;
    use crate::symbols::SymbolTable;

    fn game(
        script: &[&str],
        grids: Vec<Grid>,
    ) -> GameLoop<ScriptedInput, RecordingSink, FixedGridSource> {
        let session = SpinSession::new(
            GameConfig::default(),
            SymbolTable::standard(),
            FixedGridSource::new(grids),
        )
        .unwrap();
        GameLoop::new(
            session,
            ScriptedInput::new(script.iter().copied()),
            RecordingSink::new(),
        )
    }

    fn losing_row() -> Vec<crate::symbols::Symbol> {
        vec![A, B, C, D, E]
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 ").unwrap(), 42);
        assert_eq!(parse_number("0").unwrap(), 0);
        assert!(parse_number("").is_err());
        assert!(parse_number("-5").is_err());
        assert!(parse_number("+5").is_err());
        assert!(parse_number("1.5").is_err());
        assert!(parse_number("abc").is_err());
        assert!(parse_number("99999999999999999999999").is_err());
    }

    #[test]
    fn test_initial_deposit_reprompts() {
        let mut game = game(&["abc", "0", "-3", "25"], vec![]);
        assert_eq!(game.step().unwrap(), GameState::Idle);
        assert_eq!(game.ledger().unwrap().get(), 25);
        assert_eq!(game.output().notices().len(), 3);
    }

    #[test]
    fn test_quit_before_deposit() {
        let mut game = game(&[], vec![]);
        let summary = game.run().unwrap();
        assert_eq!(summary, SessionSummary::default());
        assert_eq!(game.state(), GameState::Terminated);
    }

    #[test]
    fn test_idle_deposit_stays_idle() {
        let mut game = game(&["10", "d", "15", "q"], vec![]);
        game.step().unwrap();
        assert_eq!(game.step().unwrap(), GameState::Idle);
        assert_eq!(game.ledger().unwrap().get(), 25);
        assert_eq!(game.ledger().unwrap().total_deposited(), 25);
        assert_eq!(game.step().unwrap(), GameState::Terminated);
    }

    #[test]
    fn test_deposit_past_max_balance_reprompts() {
        let mut first = game(&["18446744073709551615", "d", "1", "q"], vec![]);
        let summary = first.run().unwrap();
        assert_eq!(summary.final_balance, 1);
        assert_eq!(summary.total_deposited, 1);
        assert_eq!(first.output().notices().len(), 2);

        let top = MAX_BALANCE.to_string();
        let mut capped = game(&[top.as_str(), "d", "1"], vec![]);
        assert_eq!(capped.step().unwrap(), GameState::Idle);
        assert_eq!(capped.step().unwrap(), GameState::Terminated);
        assert_eq!(capped.ledger().unwrap().get(), MAX_BALANCE);
        assert_eq!(capped.ledger().unwrap().total_deposited(), MAX_BALANCE);
        assert_eq!(capped.output().notices().len(), 1);
        let prompts = capped.input.prompts();
        assert_eq!(prompts[prompts.len() - 2], prompts[prompts.len() - 1]);
        assert_eq!(prompts[prompts.len() - 1], "What would you like to deposit? $");
    }

    #[test]
    fn test_play_prompts_for_lines_and_bet() {
        let mut game = game(&["100", "", "9", "x", "2", "0", "500", "10"], vec![]);
        game.step().unwrap();
        let bet = Bet {
            lines: 2,
            per_line: 10,
        };
        assert_eq!(game.step().unwrap(), GameState::Spinning(bet));
        assert_eq!(
            game.output().notices(),
            vec![
                "Please enter a valid number of lines!",
                "Please enter a valid number of lines!",
                "Amount must be between $1 - $100!",
                "Amount must be between $1 - $100!",
            ]
        );
    }

    #[test]
    fn test_unaffordable_bet_reprompted() {
        let mut game = game(&["50", "", "3", "20", "15"], vec![]);
        game.step().unwrap();
        let next = game.step().unwrap();
        assert_eq!(
            next,
            GameState::Spinning(Bet {
                lines: 3,
                per_line: 15
            })
        );
        assert_eq!(
            game.output().notices(),
            vec!["You do not have enough to bet that amount, your current balance is $50."]
        );
        assert_eq!(game.ledger().unwrap().get(), 50);
    }

    #[test]
    fn test_spin_offers_rebet_when_affordable() {
        let grid = Grid::from_rows(vec![losing_row()]).unwrap();
        let mut game = game(&["30", "", "1", "10"], vec![grid]);
        game.step().unwrap();
        game.step().unwrap();
        let bet = Bet {
            lines: 1,
            per_line: 10,
        };
        assert_eq!(game.step().unwrap(), GameState::Rebetting(bet));
        assert_eq!(game.ledger().unwrap().get(), 20);

        game.step().unwrap();
        assert_eq!(
            game.input.prompts().last().map(String::as_str),
            Some("Would you like to rebet? $10 on 1 lines! (Y/N)")
        );
    }

    #[test]
    fn test_spin_returns_idle_when_bet_too_big() {
        let grid = Grid::from_rows(vec![losing_row()]).unwrap();
        let mut game = game(&["15", "", "1", "10"], vec![grid]);
        game.step().unwrap();
        game.step().unwrap();
        assert_eq!(game.step().unwrap(), GameState::Idle);
        assert_eq!(game.ledger().unwrap().get(), 5);
    }

    #[test]
    fn test_declined_rebet_goes_idle() {
        let grid = Grid::from_rows(vec![losing_row()]).unwrap();
        let mut game = game(&["30", "", "1", "10", "N"], vec![grid]);
        for _ in 0..3 {
            game.step().unwrap();
        }
        assert_eq!(game.step().unwrap(), GameState::Idle);
    }

    #[test]
    fn test_input_closed_terminates() {
        let grid = Grid::from_rows(vec![losing_row()]).unwrap();
        let mut game = game(&["30", "", "1", "10"], vec![grid]);
        let summary = game.run().unwrap();
        assert_eq!(summary.final_balance, 20);
        assert_eq!(summary.total_deposited, 30);
        assert_eq!(summary.net_result(), -10);
        assert!(!summary.is_win());
        assert!(matches!(
            game.output().events.last(),
            Some(GameEvent::Summary(_))
        ));
    }

    #[test]
    fn test_summary_break_even_is_win() {
        let summary = SessionSummary {
            final_balance: 40,
            total_deposited: 40,
            stats: SessionStats::default(),
        };
        assert!(summary.is_win());
        assert_eq!(summary.net_result(), 0);
    }
}
