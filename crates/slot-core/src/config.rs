//! Game configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::ledger::MAX_BALANCE;
use crate::symbols::SymbolTable;

/// Columns on the grid
pub const COLS: usize = 5;
/// Most lines a player can bet on
pub const MAX_LINES: u32 = 5;
/// Smallest bet per line
pub const MIN_BET: u64 = 1;
/// Largest bet per line
pub const MAX_BET: u64 = 100;

/// Table limits and RNG seeding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of columns (reels)
    pub cols: usize,
    /// Lines available to bet on; also the tallest grid drawn
    pub max_lines: u32,
    pub min_bet: u64,
    pub max_bet: u64,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: COLS,
            max_lines: MAX_LINES,
            min_bet: MIN_BET,
            max_bet: MAX_BET,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => Self::from_json(&text),
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            other => Err(SlotError::Parse(format!(
                "unsupported config extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    pub fn from_json(text: &str) -> SlotResult<Self> {
        serde_json::from_str(text).map_err(|e| SlotError::Parse(e.to_string()))
    }

    pub fn from_yaml(text: &str) -> SlotResult<Self> {
        serde_yml::from_str(text).map_err(|e| SlotError::Parse(e.to_string()))
    }

    /// Smallest stake any spin can have: one line at `min_bet`
    pub fn min_stake(&self) -> u64 {
        self.min_bet
    }

    pub fn lines_in_range(&self, lines: u32) -> bool {
        (1..=self.max_lines).contains(&lines)
    }

    pub fn bet_in_range(&self, per_line: u64) -> bool {
        (self.min_bet..=self.max_bet).contains(&per_line)
    }

    /// Check the limits against the symbol table
    pub fn validate(&self, table: &SymbolTable) -> SlotResult<()> {
        table.validate()?;

        if self.cols == 0 {
            return Err(SlotError::Configuration("cols must be at least 1".into()));
        }
        if self.max_lines == 0 {
            return Err(SlotError::Configuration("max_lines must be at least 1".into()));
        }
        if self.min_bet == 0 {
            return Err(SlotError::Configuration("min_bet must be at least 1".into()));
        }
        if self.min_bet > self.max_bet {
            return Err(SlotError::Configuration(format!(
                "min_bet {} exceeds max_bet {}",
                self.min_bet, self.max_bet
            )));
        }
        if self.max_lines as usize > table.pool_size() {
            return Err(SlotError::Configuration(format!(
                "max_lines {} exceeds the symbol pool of {}",
                self.max_lines,
                table.pool_size()
            )));
        }
        let top_payout = self
            .max_payout(table)
            .filter(|&payout| payout <= MAX_BALANCE);
        if top_payout.is_none() {
            return Err(SlotError::Configuration(format!(
                "top payout {} x {} x {} exceeds the limit of {MAX_BALANCE}",
                self.max_lines,
                self.max_bet,
                table.max_multiplier()
            )));
        }

        Ok(())
    }

    /// Largest possible single-spin payout, `None` on overflow
    pub fn max_payout(&self, table: &SymbolTable) -> Option<u64> {
        u64::from(self.max_lines)
            .checked_mul(self.max_bet)?
            .checked_mul(table.max_multiplier())
    }
}
