//! # slot-core — Line slot spin-and-settlement engine
//!
//! Weighted grid generation, straight-line payout evaluation and the balance
//! state machine behind a single-player terminal slot game.
//!
//! ## Architecture
//!
//! ```text
//! GameLoop (InputProvider, OutputSink)
//!     │
//!     ├── BalanceLedger (balance, total deposited)
//!     └── SpinSession
//!           ├── GameConfig (cols, line/bet limits, seed)
//!           ├── SymbolTable (weights, multipliers)
//!           ├── GridSource → Grid
//!           └── evaluate → winnings, winning lines
//!                 │
//!                 v
//!           SpinOutcome → GameEvent
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod ledger;
pub mod paytable;
pub mod spin;
pub mod symbols;

pub use config::*;
pub use error::*;
pub use game::*;
pub use grid::*;
pub use ledger::*;
pub use paytable::*;
pub use spin::*;
pub use symbols::*;
