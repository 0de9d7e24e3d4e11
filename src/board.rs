//! Game board representation and row bookkeeping

/// Column count, fixed by the display hardware (one 8-bit shift register per row)
pub const BOARD_WIDTH: usize = 8;
/// Rows contributed by each daisy-chained display module
pub const MODULE_HEIGHT: usize = 8;

/// The settled-cell grid
///
/// Row 0 is the floor, row `height - 1` the top. Height is fixed at
/// construction; the engine validates it before a board ever exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    height: usize,
    /// Grid stored as [row][col], flattened row-major
    cells: Vec<bool>,
}

impl Board {
    /// Create a new empty board with the given height
    pub fn new(height: usize) -> Self {
        Self {
            height,
            cells: vec![false; height * BOARD_WIDTH],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= BOARD_WIDTH {
            return None;
        }
        Some(row * BOARD_WIDTH + col)
    }

    /// Get the cell at (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<bool> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Set the cell at (row, col)
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, occupied: bool) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx] = occupied;
                true
            }
            None => false,
        }
    }

    /// Check whether a cell is within bounds and occupied
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        matches!(self.get(row, col), Some(true))
    }

    /// Check whether every column of a row is occupied
    pub fn is_row_full(&self, row: usize) -> bool {
        if row >= self.height {
            return false;
        }
        let start = row * BOARD_WIDTH;
        self.cells[start..start + BOARD_WIDTH].iter().all(|&c| c)
    }

    /// Drop every row above `row` down by one and clear the topmost row
    ///
    /// Only meaningful after `is_row_full(row)` has identified a full row.
    pub fn collapse_row(&mut self, row: usize) {
        if row >= self.height {
            return;
        }
        for r in row..self.height - 1 {
            let src = (r + 1) * BOARD_WIDTH;
            self.cells.copy_within(src..src + BOARD_WIDTH, r * BOARD_WIDTH);
        }
        let top = (self.height - 1) * BOARD_WIDTH;
        self.cells[top..top + BOARD_WIDTH].fill(false);
    }

    /// Cells of one row, left to right
    /// Returns None if out of bounds
    pub fn row_cells(&self, row: usize) -> Option<&[bool]> {
        if row >= self.height {
            return None;
        }
        let start = row * BOARD_WIDTH;
        Some(&self.cells[start..start + BOARD_WIDTH])
    }
}
