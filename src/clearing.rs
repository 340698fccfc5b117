use std::cmp::Reverse;

use crate::board::LockedCells;
use crate::geometry::BoardSize;
use crate::shape::Shape;

/// Rows whose every cell is locked, top to bottom.
pub fn complete_rows(board: BoardSize, shapes: &[Shape]) -> Vec<usize> {
    LockedCells::of_locked(board, shapes).complete_rows()
}

/// Removes every complete row and lets the shapes above settle.
///
/// Each cleared cell is carved out of its shape, which closes the gap inside
/// that shape. Shapes left empty are dropped from the collection. Every shape
/// that still reaches above the lowest cleared row then falls as far as it
/// can, bottom-most shape first, so that no shape stays suspended over the
/// rows that were removed. Returns the number of rows cleared.
pub fn clear_completed_lines(board: BoardSize, shapes: &mut Vec<Shape>) -> u32 {
    let rows = complete_rows(board, shapes);
    let Some(&lowest) = rows.last() else {
        return 0;
    };

    // Top-down, so a cell closing a gap never lands in a row still to clear.
    for &row in &rows {
        for shape in shapes.iter_mut() {
            for cell in board.row_cells(row) {
                shape.remove_cell(cell);
            }
        }
    }
    shapes.retain(|shape| !shape.is_empty());

    settle_shapes_above(board, lowest, shapes);

    rows.len() as u32
}

fn settle_shapes_above(board: BoardSize, row: usize, shapes: &mut [Shape]) {
    let boundary = board.index(row, 0);
    let mut order: Vec<usize> = (0..shapes.len())
        .filter(|&at| shapes[at].top_cell().is_some_and(|top| top < boundary))
        .collect();
    order.sort_by_key(|&at| Reverse(shapes[at].top_cell()));

    for at in order {
        shapes[at].unlock();
        loop {
            let locked = LockedCells::of_locked(board, shapes);
            if !shapes[at].move_down(&locked) {
                break;
            }
        }
    }
}
