//! Line evaluation and win calculation

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::grid::Grid;
use crate::symbols::{Symbol, SymbolTable};

/// A win on a single straight line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    /// Line number (1-based)
    pub line: u32,
    /// Symbol filling the line
    pub symbol: Symbol,
    /// Win amount (multiplier × bet per line)
    pub amount: u64,
}

/// Result of evaluating the bet lines of a grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub line_wins: Vec<LineWin>,
    pub winnings: u64,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        self.winnings > 0
    }

    /// Winning line numbers, ascending
    pub fn winning_lines(&self) -> Vec<u32> {
        self.line_wins.iter().map(|w| w.line).collect()
    }
}

/// Evaluate the first `line_count` rows of a grid.
///
/// A row wins when every column shows the same symbol on it. Rows past
/// `line_count` are not looked at.
pub fn evaluate(
    grid: &Grid,
    line_count: u32,
    bet_per_line: u64,
    table: &SymbolTable,
) -> SlotResult<Evaluation> {
    if line_count as usize > grid.rows() {
        return Err(SlotError::InvalidBet {
            lines: line_count,
            per_line: bet_per_line,
            reason: format!("grid only has {} row(s)", grid.rows()),
        });
    }

    let mut eval = Evaluation::default();

    for row in 0..line_count as usize {
        let Some(symbol) = grid.get(0, row) else {
            continue;
        };
        let matched = (1..grid.cols()).all(|col| grid.get(col, row) == Some(symbol));
        if !matched {
            continue;
        }

        let amount = table
            .multiplier(symbol)
            .checked_mul(bet_per_line)
            .ok_or_else(|| payout_overflow(line_count, bet_per_line))?;
        eval.winnings = eval
            .winnings
            .checked_add(amount)
            .ok_or_else(|| payout_overflow(line_count, bet_per_line))?;
        eval.line_wins.push(LineWin {
            line: row as u32 + 1,
            symbol,
            amount,
        });
    }

    Ok(eval)
}

fn payout_overflow(lines: u32, per_line: u64) -> SlotError {
    SlotError::InvalidBet {
        lines,
        per_line,
        reason: "payout overflows".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol::*;

    fn table() -> SymbolTable {
        SymbolTable::standard()
    }

    #[test]
    fn test_all_rows_matching() {
        let grid = Grid::from_rows(vec![vec![A; 5], vec![C; 5], vec![E; 5]]).unwrap();
        let eval = evaluate(&grid, 3, 10, &table()).unwrap();
        assert_eq!(eval.winnings, (16 + 7 + 2) * 10);
        assert_eq!(eval.winning_lines(), vec![1, 2, 3]);
        assert!(eval.is_win());
    }

    #[test]
    fn test_no_matching_row() {
        let grid = Grid::from_rows(vec![vec![A, A, A, A, B], vec![C, D, C, C, C]]).unwrap();
        let eval = evaluate(&grid, 2, 5, &table()).unwrap();
        assert_eq!(eval.winnings, 0);
        assert!(eval.winning_lines().is_empty());
        assert!(!eval.is_win());
    }

    #[test]
    fn test_rows_beyond_line_count_ignored() {
        let grid = Grid::from_rows(vec![vec![A, B, C, D, E], vec![B; 5]]).unwrap();
        let eval = evaluate(&grid, 1, 3, &table()).unwrap();
        assert_eq!(eval.winnings, 0);

        let eval = evaluate(&grid, 2, 3, &table()).unwrap();
        assert_eq!(eval.winnings, 11 * 3);
        assert_eq!(eval.winning_lines(), vec![2]);
        assert_eq!(eval.line_wins[0].symbol, B);
    }

    #[test]
    fn test_line_count_above_rows_rejected() {
        let grid = Grid::from_rows(vec![vec![E; 5]]).unwrap();
        assert!(matches!(
            evaluate(&grid, 2, 1, &table()),
            Err(SlotError::InvalidBet { .. })
        ));
    }

    #[test]
    fn test_oversized_bet_overflows_cleanly() {
        let grid = Grid::from_rows(vec![vec![A; 5], vec![E; 5]]).unwrap();
        assert!(matches!(
            evaluate(&grid, 1, u64::MAX, &table()),
            Err(SlotError::InvalidBet { .. })
        ));
        assert!(matches!(
            evaluate(&grid, 2, u64::MAX / 16, &table()),
            Err(SlotError::InvalidBet { .. })
        ));
    }

    #[test]
    fn test_single_e_line() {
        let grid = Grid::from_rows(vec![vec![E; 5]]).unwrap();
        let eval = evaluate(&grid, 1, 10, &table()).unwrap();
        assert_eq!(eval.winnings, 20);
        assert_eq!(eval.winning_lines(), vec![1]);
    }
}
