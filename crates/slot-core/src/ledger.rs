//! Player balance ledger

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Largest balance a deposit may bring the ledger to
pub const MAX_BALANCE: u64 = 1_000_000_000_000;

/// Current balance plus everything ever deposited.
///
/// The balance never goes below zero: `apply_net` refuses an overdraft
/// instead of clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLedger {
    current: u64,
    total_deposited: u64,
}

impl BalanceLedger {
    /// Open a ledger with the first deposit
    pub fn open(initial: u64) -> SlotResult<Self> {
        if initial == 0 {
            return Err(SlotError::InvalidInput("initial deposit must be greater than 0".into()));
        }
        if initial > MAX_BALANCE {
            return Err(SlotError::InvalidInput(format!(
                "deposit would exceed the maximum balance of {MAX_BALANCE}"
            )));
        }
        info!("ledger opened with deposit {initial}");
        Ok(Self {
            current: initial,
            total_deposited: initial,
        })
    }

    /// Add funds. Refused, with the ledger untouched, when the balance
    /// would pass [`MAX_BALANCE`].
    pub fn deposit(&mut self, amount: u64) -> SlotResult<u64> {
        if amount == 0 {
            return Err(SlotError::InvalidInput("deposit must be greater than 0".into()));
        }
        let current = self.current.checked_add(amount).filter(|&b| b <= MAX_BALANCE);
        let total = self.total_deposited.checked_add(amount);
        let (Some(current), Some(total)) = (current, total) else {
            warn!("refused deposit {amount} against balance {}", self.current);
            return Err(SlotError::InvalidInput(format!(
                "deposit would exceed the maximum balance of {MAX_BALANCE}"
            )));
        };
        self.current = current;
        self.total_deposited = total;
        info!(
            "deposited {amount}, balance {} (total deposited {})",
            self.current, self.total_deposited
        );
        Ok(self.current)
    }

    pub fn can_afford(&self, stake: u64) -> bool {
        self.current >= stake
    }

    /// Settle a spin's net result
    pub fn apply_net(&mut self, net: i64) -> SlotResult<u64> {
        let next = if net >= 0 {
            self.current.checked_add(net.unsigned_abs())
        } else {
            self.current.checked_sub(net.unsigned_abs())
        };

        match next {
            Some(balance) => {
                self.current = balance;
                Ok(balance)
            }
            None => {
                warn!("refused net {net} against balance {}", self.current);
                Err(SlotError::Overdraft {
                    balance: self.current,
                    net,
                })
            }
        }
    }

    pub fn get(&self) -> u64 {
        self.current
    }

    pub fn total_deposited(&self) -> u64 {
        self.total_deposited
    }

    /// Balance relative to everything deposited
    pub fn net_result(&self) -> i64 {
        self.current as i64 - self.total_deposited as i64
    }
}
