//! Active falling piece: footprint storage and geometric transforms
//!
//! A piece is a mapping from board column to the rows it occupies in that
//! column, held in absolute board coordinates. Transforms produce candidate
//! pieces; the engine decides whether a candidate is committed.

use std::collections::BTreeMap;

use crate::board::BOARD_WIDTH;

/// Footprint of the currently falling shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Column -> occupied rows in that column, rows sorted ascending
    cells: BTreeMap<i32, Vec<i32>>,
}

impl Piece {
    /// Build a piece from (column, rows) pairs
    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (i32, Vec<i32>)>,
    {
        let mut cells: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        for (col, rows) in columns {
            cells.entry(col).or_default().extend(rows);
        }
        for rows in cells.values_mut() {
            rows.sort_unstable();
        }
        Self { cells }
    }

    /// Iterate over every occupied (col, row) cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells
            .iter()
            .flat_map(|(&col, rows)| rows.iter().map(move |&row| (col, row)))
    }

    /// The lowest occupied row of each column
    pub fn lowest_rows(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        // Rows are kept sorted, so the first entry is the lowest
        self.cells.iter().map(|(&col, rows)| (col, rows[0]))
    }

    /// Drop every cell by one row, unconditionally
    ///
    /// Callers must have ruled out resting first; there is no validity
    /// check in this primitive.
    pub fn move_down(&mut self) {
        for rows in self.cells.values_mut() {
            for row in rows {
                *row -= 1;
            }
        }
    }

    /// Candidate footprint shifted sideways by `delta` columns
    pub fn shifted(&self, delta: i32) -> Piece {
        Self {
            cells: self
                .cells
                .iter()
                .map(|(&col, rows)| (col + delta, rows.clone()))
                .collect(),
        }
    }

    /// Candidate footprint rotated 90 degrees clockwise about the centroid
    ///
    /// The centroid is the mean of all occupied cells, each coordinate
    /// rounded to the nearest integer with ties going to the even neighbor.
    /// After the rotation the candidate is corrected in three single
    /// passes: shift right if it crossed the left wall, shift left if it
    /// crossed the right wall, and shift down by one row if any cell ended
    /// up above the board. The corrections are not iterated to convergence.
    pub fn rotated(&self, height: i32) -> Piece {
        let coords: Vec<(i32, i32)> = self.cells().collect();
        let n = coords.len() as f64;
        let center_col =
            round_half_even(coords.iter().map(|&(col, _)| col as f64).sum::<f64>() / n);
        let center_row =
            round_half_even(coords.iter().map(|&(_, row)| row as f64).sum::<f64>() / n);

        // [[0,-1],[1,0]] applied to (col, row) relative to the centroid
        let mut cells: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        for (col, row) in coords {
            let new_col = center_col - (row - center_row);
            let new_row = center_row + (col - center_col);
            cells.entry(new_col).or_default().push(new_row);
        }
        for rows in cells.values_mut() {
            rows.sort_unstable();
        }
        let mut piece = Self { cells };

        // BTreeMap keys are ordered, so a single-column piece collapses the
        // min/max to that one column naturally
        if let (Some(&min_col), Some(&max_col)) =
            (piece.cells.keys().next(), piece.cells.keys().next_back())
        {
            if min_col < 0 {
                piece = piece.shifted(-min_col);
            }
            if max_col > BOARD_WIDTH as i32 - 1 {
                piece = piece.shifted(BOARD_WIDTH as i32 - 1 - max_col);
            }
        }

        if piece.cells().any(|(_, row)| row >= height) {
            for rows in piece.cells.values_mut() {
                for row in rows {
                    *row -= 1;
                }
            }
        }

        piece
    }
}

/// Round to the nearest integer, ties to the even neighbor
///
/// A four-cell shape's coordinate mean lands on an exact half whenever the
/// cells straddle two columns or rows evenly; the tie decides which column
/// a rotating bar pivots into, so it must not drift to one side.
fn round_half_even(value: f64) -> i32 {
    let floor = value.floor();
    if value - floor == 0.5 {
        let below = floor as i32;
        if below % 2 == 0 { below } else { below + 1 }
    } else {
        value.round() as i32
    }
}
