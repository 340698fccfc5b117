use crate::geometry::BoardSize;
use crate::shape::Shape;

/// The immovable cells of the board: the union of every locked shape.
///
/// This is a view derived from the shape collection and holds no game state
/// of its own. Rebuild it whenever the collection changes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LockedCells {
    board: BoardSize,
    occupied: Vec<bool>,
}

impl LockedCells {
    pub fn empty(board: BoardSize) -> Self {
        Self {
            board,
            occupied: vec![false; board.cell_count()],
        }
    }

    pub fn of_locked(board: BoardSize, shapes: &[Shape]) -> Self {
        let mut locked = Self::empty(board);
        for shape in shapes.iter().filter(|shape| shape.is_locked()) {
            for &cell in shape.cells() {
                if let Some(slot) = locked.occupied.get_mut(cell) {
                    *slot = true;
                }
            }
        }
        locked
    }

    pub fn board(&self) -> BoardSize {
        self.board
    }

    pub fn contains(&self, index: usize) -> bool {
        self.occupied.get(index).copied().unwrap_or(false)
    }

    /// Out of bounds or occupied. Column wraparound is the caller's concern.
    pub fn is_blocked(&self, index: isize) -> bool {
        if index < 0 {
            return true;
        }
        let index = index as usize;
        index >= self.board.cell_count() || self.occupied[index]
    }

    pub fn overlaps(&self, cells: &[usize]) -> bool {
        cells.iter().any(|&cell| self.contains(cell))
    }

    pub fn is_row_complete(&self, row: usize) -> bool {
        row < self.board.height && self.board.row_cells(row).all(|cell| self.occupied[cell])
    }

    /// Complete rows, top to bottom.
    pub fn complete_rows(&self) -> Vec<usize> {
        (0..self.board.height)
            .filter(|&row| self.is_row_complete(row))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.occupied.iter().filter(|&&cell| cell).count()
    }
}
