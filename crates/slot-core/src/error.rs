//! Error types for the slot engine

use thiserror::Error;

/// Slot engine errors
#[derive(Error, Debug)]
pub enum SlotError {
    /// Non-numeric or out-of-range entry at a prompt
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bet outside the table limits or larger than the balance
    #[error("Invalid bet of {per_line} on {lines} line(s): {reason}")]
    InvalidBet {
        lines: u32,
        per_line: u64,
        reason: String,
    },

    /// Settlement would take the balance below zero
    #[error("Overdraft: balance {balance} cannot absorb net {net}")]
    Overdraft { balance: u64, net: i64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SlotError {
    /// Errors the game loop recovers from by re-prompting
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidBet { .. })
    }
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
