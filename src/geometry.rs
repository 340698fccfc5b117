use crate::board::LockedCells;

// ============================================================================
// Board Size
// ============================================================================

/// Smallest board edge on which every tetromino fits in every orientation.
pub const MIN_BOARD_EDGE: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoardSize {
    pub width: usize,
    pub height: usize,
}

impl BoardSize {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board must be at least 1x1");
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn index(&self, row: usize, column: usize) -> usize {
        row * self.width + column
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.width
    }

    pub fn column_of(&self, index: usize) -> usize {
        index % self.width
    }

    /// All cell indices of one board row, left to right.
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = usize> {
        let start = row * self.width;
        start..start + self.width
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::new(10, 20)
    }
}

// ============================================================================
// Cell Predicates
// ============================================================================

/// Row of a possibly negative cell index. Indices left of column 0 on row 0
/// land on row -1.
pub fn row_of_signed(index: isize, width: usize) -> isize {
    index.div_euclid(width as isize)
}

pub fn same_row(a: isize, b: isize, width: usize) -> bool {
    row_of_signed(a, width) == row_of_signed(b, width)
}

/// True when every cell sits on the same board row.
pub fn on_one_row(cells: &[isize], width: usize) -> bool {
    match cells.split_first() {
        Some((&first, rest)) => rest.iter().all(|&cell| same_row(first, cell, width)),
        None => true,
    }
}

/// True when any cell falls outside the board or onto a locked cell.
pub fn out_of_bounds_or_occupied(cells: &[isize], locked: &LockedCells) -> bool {
    cells.iter().any(|&cell| locked.is_blocked(cell))
}
