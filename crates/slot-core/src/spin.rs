//! Single-spin orchestration: validate, draw, evaluate, settle

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{SlotError, SlotResult};
use crate::grid::{Grid, GridSource, WeightedGridGenerator};
use crate::ledger::BalanceLedger;
use crate::paytable::{LineWin, evaluate};
use crate::symbols::SymbolTable;

/// Lines and bet per line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bet {
    pub lines: u32,
    pub per_line: u64,
}

impl Bet {
    /// Create a bet, checking it against the table limits
    pub fn new(lines: u32, per_line: u64, config: &GameConfig) -> SlotResult<Self> {
        if !config.lines_in_range(lines) {
            return Err(SlotError::InvalidBet {
                lines,
                per_line,
                reason: format!("lines must be between 1 and {}", config.max_lines),
            });
        }
        if !config.bet_in_range(per_line) {
            return Err(SlotError::InvalidBet {
                lines,
                per_line,
                reason: format!(
                    "bet per line must be between {} and {}",
                    config.min_bet, config.max_bet
                ),
            });
        }
        Ok(Self { lines, per_line })
    }

    /// Total wagered on the spin
    pub fn total_stake(&self) -> u64 {
        u64::from(self.lines).saturating_mul(self.per_line)
    }
}

/// Everything a spin produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub bet: Bet,
    /// Drawn grid (`bet.lines` rows)
    pub grid: Grid,
    pub winnings: u64,
    /// Winning line numbers (1-based, ascending)
    pub winning_lines: Vec<u32>,
    pub line_wins: Vec<LineWin>,
    /// `winnings - stake`
    pub net: i64,
    /// Balance after settlement
    pub balance: u64,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.winnings > 0
    }
}

/// Running totals for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_staked: u64,
    pub total_won: u64,
    pub winning_spins: u64,
    pub biggest_win: u64,
}

impl SessionStats {
    fn record(&mut self, outcome: &SpinOutcome) {
        self.total_spins += 1;
        self.total_staked += outcome.bet.total_stake();
        self.total_won += outcome.winnings;
        if outcome.is_win() {
            self.winning_spins += 1;
        }
        self.biggest_win = self.biggest_win.max(outcome.winnings);
    }

    /// Percentage of spins that paid anything
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.winning_spins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Return to player, percent
    pub fn rtp(&self) -> f64 {
        if self.total_staked > 0 {
            (self.total_won as f64 / self.total_staked as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Runs spins against a ledger
pub struct SpinSession<G: GridSource = WeightedGridGenerator> {
    config: GameConfig,
    table: SymbolTable,
    source: G,
    stats: SessionStats,
}

impl SpinSession<WeightedGridGenerator> {
    /// Session on the standard table, seeded from `config.seed` or the OS
    pub fn from_config(config: GameConfig) -> SlotResult<Self> {
        let source = match config.seed {
            Some(seed) => WeightedGridGenerator::seeded(seed),
            None => WeightedGridGenerator::from_os_rng(),
        };
        Self::new(config, SymbolTable::standard(), source)
    }
}

impl<G: GridSource> SpinSession<G> {
    pub fn new(config: GameConfig, table: SymbolTable, source: G) -> SlotResult<Self> {
        config.validate(&table)?;
        Ok(Self {
            config,
            table,
            source,
            stats: SessionStats::default(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Check a bet against the limits and the balance, without drawing
    pub fn validate_bet(
        &self,
        ledger: &BalanceLedger,
        lines: u32,
        per_line: u64,
    ) -> SlotResult<Bet> {
        let bet = Bet::new(lines, per_line, &self.config)?;
        if !ledger.can_afford(bet.total_stake()) {
            return Err(SlotError::InvalidBet {
                lines,
                per_line,
                reason: format!(
                    "stake {} exceeds balance {}",
                    bet.total_stake(),
                    ledger.get()
                ),
            });
        }
        Ok(bet)
    }

    /// Play one spin and settle it on the ledger
    pub fn spin(
        &mut self,
        ledger: &mut BalanceLedger,
        lines: u32,
        per_line: u64,
    ) -> SlotResult<SpinOutcome> {
        let bet = match self.validate_bet(ledger, lines, per_line) {
            Ok(bet) => bet,
            Err(e) => {
                warn!("bet refused: {e}");
                return Err(e);
            }
        };

        let grid = self
            .source
            .generate(bet.lines as usize, self.config.cols, &self.table)?;
        let eval = evaluate(&grid, bet.lines, bet.per_line, &self.table)?;

        let net = i64::try_from(eval.winnings)
            .ok()
            .zip(i64::try_from(bet.total_stake()).ok())
            .map(|(won, staked)| won - staked)
            .ok_or_else(|| {
                SlotError::Configuration(format!("payout {} out of range", eval.winnings))
            })?;
        let balance = ledger.apply_net(net)?;

        let outcome = SpinOutcome {
            bet,
            grid,
            winnings: eval.winnings,
            winning_lines: eval.winning_lines(),
            line_wins: eval.line_wins,
            net,
            balance,
        };
        self.stats.record(&outcome);

        debug!(
            "spin #{}: {} x {} -> won {} on {:?}, net {}, balance {}",
            self.stats.total_spins,
            bet.lines,
            bet.per_line,
            outcome.winnings,
            outcome.winning_lines,
            net,
            balance
        );

        Ok(outcome)
    }
}
