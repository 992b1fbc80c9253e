//! Grid generation
//!
//! Every column draws from its own copy of the weighted pool, without
//! replacement, so a column never shows a symbol more often than its weight.

use std::fmt;

use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::{Symbol, SymbolTable};

/// Spin result grid, stored column-major (`columns[col][row]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    columns: Vec<Vec<Symbol>>,
}

impl Grid {
    /// Build from columns; all columns must have the same height
    pub fn from_columns(columns: Vec<Vec<Symbol>>) -> SlotResult<Self> {
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || columns.iter().any(|c| c.len() != rows) {
            return Err(SlotError::Configuration(
                "grid columns must be non-empty and of equal height".into(),
            ));
        }
        Ok(Self { columns })
    }

    /// Build from rows as they are displayed (`rows[row][col]`)
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> SlotResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return Err(SlotError::Configuration(
                "grid rows must be non-empty and of equal width".into(),
            ));
        }
        let columns = (0..cols)
            .map(|c| rows.iter().map(|row| row[c]).collect())
            .collect();
        Ok(Self { columns })
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Symbol> {
        self.columns.get(col).and_then(|c| c.get(row)).copied()
    }

    pub fn column(&self, col: usize) -> Option<&[Symbol]> {
        self.columns.get(col).map(Vec::as_slice)
    }

    pub fn columns(&self) -> &[Vec<Symbol>] {
        &self.columns
    }

    /// Symbols on one row, left to right
    pub fn row(&self, row: usize) -> Vec<Symbol> {
        self.columns.iter().filter_map(|c| c.get(row).copied()).collect()
    }

    /// Row-major view for presentation
    pub fn to_rows(&self) -> Vec<Vec<Symbol>> {
        (0..self.rows()).map(|r| self.row(r)).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            let line: Vec<&str> = self.row(row).iter().map(|s| s.name()).collect();
            writeln!(f, "{}", line.join(" | "))?;
        }
        Ok(())
    }
}

/// Anything that can produce a spin grid
pub trait GridSource {
    fn generate(&mut self, rows: usize, cols: usize, table: &SymbolTable) -> SlotResult<Grid>;
}

/// Weighted, without-replacement per-column generator
pub struct WeightedGridGenerator<R: Rng = StdRng> {
    rng: R,
}

impl WeightedGridGenerator<StdRng> {
    /// Generator seeded from the operating system
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seed RNG for reproducible results
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> GridSource for WeightedGridGenerator<R> {
    fn generate(&mut self, rows: usize, cols: usize, table: &SymbolTable) -> SlotResult<Grid> {
        generate_grid(&mut self.rng, rows, cols, table)
    }
}

/// Draw a `rows × cols` grid from the table's weighted pool
pub fn generate_grid<R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    table: &SymbolTable,
) -> SlotResult<Grid> {
    let pool = table.pool();

    if rows == 0 || cols == 0 {
        return Err(SlotError::Configuration(format!(
            "grid must have at least one row and column, got {rows}x{cols}"
        )));
    }
    if rows > pool.len() {
        return Err(SlotError::Configuration(format!(
            "{rows} rows exceed the symbol pool of {}",
            pool.len()
        )));
    }

    let mut columns = Vec::with_capacity(cols);
    for _ in 0..cols {
        let mut remaining = pool.clone();
        let mut column = Vec::with_capacity(rows);
        for _ in 0..rows {
            let idx = rng.random_range(0..remaining.len());
            column.push(remaining.swap_remove(idx));
        }
        columns.push(column);
    }

    let grid = Grid { columns };
    debug!("generated {rows}x{cols} grid:\n{grid}");
    Ok(grid)
}

/// Replays scripted grids in order, for deterministic sessions
#[derive(Debug, Clone, Default)]
pub struct FixedGridSource {
    grids: std::collections::VecDeque<Grid>,
}

impl FixedGridSource {
    pub fn new(grids: impl IntoIterator<Item = Grid>) -> Self {
        Self {
            grids: grids.into_iter().collect(),
        }
    }
}

impl GridSource for FixedGridSource {
    fn generate(&mut self, rows: usize, cols: usize, _table: &SymbolTable) -> SlotResult<Grid> {
        let grid = self
            .grids
            .pop_front()
            .ok_or_else(|| SlotError::Configuration("no scripted grid left".into()))?;
        if grid.rows() < rows || grid.cols() != cols {
            return Err(SlotError::Configuration(format!(
                "scripted grid is {}x{}, spin needs {rows}x{cols}",
                grid.rows(),
                grid.cols()
            )));
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolSpec;

    #[test]
    fn test_grid_dimensions() {
        let mut generator = WeightedGridGenerator::seeded(7);
        let table = SymbolTable::standard();
        let grid = generator.generate(3, 5, &table).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.to_rows().len(), 3);
    }

    #[test]
    fn test_columns_respect_weights() {
        let mut generator = WeightedGridGenerator::seeded(42);
        let table = SymbolTable::standard();

        for _ in 0..2_000 {
            let grid = generator.generate(5, 5, &table).unwrap();
            for column in grid.columns() {
                for symbol in Symbol::ALL {
                    let count = column.iter().filter(|&&s| s == symbol).count() as u32;
                    assert!(count <= table.weight(symbol));
                }
            }
        }
    }

    #[test]
    fn test_tight_pool_is_a_permutation() {
        // Pool of exactly 3 entries: drawing 3 rows must use each entry once
        let table = SymbolTable::from_specs(vec![
            SymbolSpec::new(Symbol::A, 1, 8),
            SymbolSpec::new(Symbol::B, 2, 3),
        ])
        .unwrap();
        let mut generator = WeightedGridGenerator::seeded(3);

        for _ in 0..200 {
            let grid = generator.generate(3, 4, &table).unwrap();
            for column in grid.columns() {
                let mut sorted = column.clone();
                sorted.sort();
                assert_eq!(sorted, vec![Symbol::A, Symbol::B, Symbol::B]);
            }
        }
    }

    #[test]
    fn test_rows_beyond_pool_rejected() {
        let table = SymbolTable::from_specs(vec![SymbolSpec::new(Symbol::A, 2, 5)]).unwrap();
        let mut generator = WeightedGridGenerator::seeded(1);
        assert!(matches!(
            generator.generate(3, 5, &table),
            Err(SlotError::Configuration(_))
        ));
        assert!(generator.generate(0, 5, &table).is_err());
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let table = SymbolTable::standard();
        let mut a = WeightedGridGenerator::seeded(99);
        let mut b = WeightedGridGenerator::seeded(99);
        for _ in 0..10 {
            assert_eq!(
                a.generate(5, 5, &table).unwrap(),
                b.generate(5, 5, &table).unwrap()
            );
        }
    }

    #[test]
    fn test_from_rows_transposes() {
        let grid = Grid::from_rows(vec![
            vec![Symbol::A, Symbol::B, Symbol::C],
            vec![Symbol::D, Symbol::E, Symbol::A],
        ])
        .unwrap();
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.column(1).unwrap(), &[Symbol::B, Symbol::E]);
        assert_eq!(grid.to_string(), "A | B | C\nD | E | A\n");
    }

    #[test]
    fn test_ragged_grid_rejected() {
        assert!(Grid::from_rows(vec![vec![Symbol::A], vec![Symbol::A, Symbol::B]]).is_err());
        assert!(Grid::from_columns(vec![]).is_err());
    }

    #[test]
    fn test_fixed_source_replays_in_order() {
        let first = Grid::from_rows(vec![vec![Symbol::A; 5]]).unwrap();
        let second = Grid::from_rows(vec![vec![Symbol::E; 5]]).unwrap();
        let mut source = FixedGridSource::new([first.clone(), second.clone()]);
        let table = SymbolTable::standard();

        assert_eq!(source.generate(1, 5, &table).unwrap(), first);
        assert_eq!(source.generate(1, 5, &table).unwrap(), second);
        assert!(source.generate(1, 5, &table).is_err());
    }
}
