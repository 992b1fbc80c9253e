//! Symbol definitions and the weighted symbol table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// A reel symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
}

impl Symbol {
    /// All symbols, rarest first
    pub const ALL: [Symbol; 5] = [Symbol::A, Symbol::B, Symbol::C, Symbol::D, Symbol::E];

    /// Single-letter name
    pub fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A symbol's abundance and pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub symbol: Symbol,
    /// Copies of the symbol in each column's pool
    pub weight: u32,
    /// Factor applied to the per-line bet on a winning line
    pub multiplier: u64,
}

impl SymbolSpec {
    pub const fn new(symbol: Symbol, weight: u32, multiplier: u64) -> Self {
        Self {
            symbol,
            weight,
            multiplier,
        }
    }
}

/// The fixed symbol table: weights for grid generation, multipliers for payouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    specs: Vec<SymbolSpec>,
}

impl SymbolTable {
    /// The standard five-symbol table (pool size 40)
    pub fn standard() -> Self {
        Self {
            specs: vec![
                SymbolSpec::new(Symbol::A, 2, 16),
                SymbolSpec::new(Symbol::B, 4, 11),
                SymbolSpec::new(Symbol::C, 7, 7),
                SymbolSpec::new(Symbol::D, 11, 4),
                SymbolSpec::new(Symbol::E, 16, 2),
            ],
        }
    }

    /// Build a table from explicit specs; checked with [`SymbolTable::validate`]
    pub fn from_specs(specs: Vec<SymbolSpec>) -> SlotResult<Self> {
        let table = Self { specs };
        table.validate()?;
        Ok(table)
    }

    pub fn specs(&self) -> &[SymbolSpec] {
        &self.specs
    }

    pub fn get(&self, symbol: Symbol) -> Option<&SymbolSpec> {
        self.specs.iter().find(|s| s.symbol == symbol)
    }

    /// Weight of a symbol (0 if absent)
    pub fn weight(&self, symbol: Symbol) -> u32 {
        self.get(symbol).map(|s| s.weight).unwrap_or(0)
    }

    /// Payout multiplier of a symbol (0 if absent)
    pub fn multiplier(&self, symbol: Symbol) -> u64 {
        self.get(symbol).map(|s| s.multiplier).unwrap_or(0)
    }

    /// Highest multiplier in the table
    pub fn max_multiplier(&self) -> u64 {
        self.specs.iter().map(|s| s.multiplier).max().unwrap_or(0)
    }

    /// Total number of entries in a column pool
    pub fn pool_size(&self) -> usize {
        self.specs.iter().map(|s| s.weight as usize).sum()
    }

    /// Flat pool: every symbol repeated `weight` times, in table order
    pub fn pool(&self) -> Vec<Symbol> {
        let mut pool = Vec::with_capacity(self.pool_size());
        for spec in &self.specs {
            pool.extend(std::iter::repeat_n(spec.symbol, spec.weight as usize));
        }
        pool
    }

    /// Check positivity, uniqueness and that rarer symbols pay strictly more
    pub fn validate(&self) -> SlotResult<()> {
        if self.specs.is_empty() {
            return Err(SlotError::Configuration("symbol table is empty".into()));
        }

        for (i, spec) in self.specs.iter().enumerate() {
            if spec.weight == 0 || spec.multiplier == 0 {
                return Err(SlotError::Configuration(format!(
                    "symbol {} needs a positive weight and multiplier",
                    spec.symbol
                )));
            }
            if self.specs[..i].iter().any(|s| s.symbol == spec.symbol) {
                return Err(SlotError::Configuration(format!(
                    "symbol {} listed twice",
                    spec.symbol
                )));
            }
        }

        for a in &self.specs {
            for b in &self.specs {
                if a.weight < b.weight && a.multiplier <= b.multiplier {
                    return Err(SlotError::Configuration(format!(
                        "symbol {} (weight {}) must pay more than {} (weight {})",
                        a.symbol, a.weight, b.symbol, b.weight
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::standard()
    }
}
