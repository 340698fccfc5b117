use crate::board::LockedCells;
use crate::geometry::{on_one_row, out_of_bounds_or_occupied, same_row, BoardSize, MIN_BOARD_EDGE};
use crate::palette::ShapeColor;

// ============================================================================
// Kinds and Orientations
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ShapeKind {
    /// The line.
    I,
    /// The square.
    O,
    T,
    S,
    Z,
    J,
    L,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Orientation {
    /// The square's only state.
    Fixed,
    Horizontal,
    Vertical,
    Up,
    Right,
    Down,
    Left,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::Z,
        ShapeKind::S,
        ShapeKind::L,
        ShapeKind::J,
    ];

    /// Orientation a freshly spawned shape starts from.
    pub fn spawn_orientation(&self) -> Orientation {
        self.spawn_layout().orientation
    }

    /// The rotation cycle in rotation order, starting from the spawn
    /// orientation.
    pub fn orientations(&self) -> impl Iterator<Item = Orientation> {
        self.layouts().iter().map(|layout| layout.orientation)
    }

    /// Orientation reached by one rotation, `None` for the square.
    pub fn next_orientation(&self, orientation: Orientation) -> Option<Orientation> {
        let layouts = self.layouts();
        if layouts.len() < 2 {
            return None;
        }
        let at = layouts
            .iter()
            .position(|layout| layout.orientation == orientation)?;
        Some(layouts[(at + 1) % layouts.len()].orientation)
    }

    fn layouts(&self) -> &'static [Layout] {
        match self {
            ShapeKind::I => &I_LAYOUTS,
            ShapeKind::O => &O_LAYOUTS,
            ShapeKind::T => &T_LAYOUTS,
            ShapeKind::S => &S_LAYOUTS,
            ShapeKind::Z => &Z_LAYOUTS,
            ShapeKind::J => &J_LAYOUTS,
            ShapeKind::L => &L_LAYOUTS,
        }
    }

    fn spawn_layout(&self) -> &'static Layout {
        &self.layouts()[0]
    }

    fn layout(&self, orientation: Orientation) -> Option<&'static Layout> {
        self.layouts()
            .iter()
            .find(|layout| layout.orientation == orientation)
    }
}

// ============================================================================
// Rotation Tables
// ============================================================================

/// Cells of one orientation as (row, column) offsets from a pivot cell.
///
/// Offsets are listed in row-major order, so a placed layout is already a
/// sorted cell set. `pivot` is the position of the (0, 0) offset.
#[derive(Debug)]
struct Layout {
    orientation: Orientation,
    offsets: [(i8, i8); 4],
    pivot: usize,
}

impl Layout {
    fn column_span(&self) -> (isize, isize) {
        let columns = self.offsets.iter().map(|&(_, dc)| dc as isize);
        (columns.clone().min().unwrap_or(0), columns.max().unwrap_or(0))
    }

    fn top_row(&self) -> isize {
        self.offsets
            .iter()
            .map(|&(dr, _)| dr as isize)
            .min()
            .unwrap_or(0)
    }

    fn place(&self, pivot: isize, width: usize) -> Vec<isize> {
        let width = width as isize;
        self.offsets
            .iter()
            .map(|&(dr, dc)| pivot + dr as isize * width + dc as isize)
            .collect()
    }
}

#[rustfmt::skip]
static I_LAYOUTS: [Layout; 2] = [
    Layout { orientation: Orientation::Horizontal, offsets: [(0, -1), (0, 0), (0, 1), (0, 2)], pivot: 1 },
    Layout { orientation: Orientation::Vertical, offsets: [(-1, 0), (0, 0), (1, 0), (2, 0)], pivot: 1 },
];

#[rustfmt::skip]
static O_LAYOUTS: [Layout; 1] = [
    Layout { orientation: Orientation::Fixed, offsets: [(0, 0), (0, 1), (1, 0), (1, 1)], pivot: 0 },
];

#[rustfmt::skip]
static T_LAYOUTS: [Layout; 4] = [
    Layout { orientation: Orientation::Down, offsets: [(0, -1), (0, 0), (0, 1), (1, 0)], pivot: 1 },
    Layout { orientation: Orientation::Left, offsets: [(-1, 0), (0, -1), (0, 0), (1, 0)], pivot: 2 },
    Layout { orientation: Orientation::Up, offsets: [(-1, 0), (0, -1), (0, 0), (0, 1)], pivot: 2 },
    Layout { orientation: Orientation::Right, offsets: [(-1, 0), (0, 0), (0, 1), (1, 0)], pivot: 1 },
];

#[rustfmt::skip]
static S_LAYOUTS: [Layout; 2] = [
    Layout { orientation: Orientation::Horizontal, offsets: [(0, 0), (0, 1), (1, -1), (1, 0)], pivot: 0 },
    Layout { orientation: Orientation::Vertical, offsets: [(-1, -1), (0, -1), (0, 0), (1, 0)], pivot: 2 },
];

#[rustfmt::skip]
static Z_LAYOUTS: [Layout; 2] = [
    Layout { orientation: Orientation::Horizontal, offsets: [(0, -1), (0, 0), (1, 0), (1, 1)], pivot: 1 },
    Layout { orientation: Orientation::Vertical, offsets: [(-1, 0), (0, -1), (0, 0), (1, -1)], pivot: 2 },
];

#[rustfmt::skip]
static L_LAYOUTS: [Layout; 4] = [
    Layout { orientation: Orientation::Down, offsets: [(0, -1), (0, 0), (0, 1), (1, -1)], pivot: 1 },
    Layout { orientation: Orientation::Left, offsets: [(-1, -1), (-1, 0), (0, 0), (1, 0)], pivot: 2 },
    Layout { orientation: Orientation::Up, offsets: [(-1, 1), (0, -1), (0, 0), (0, 1)], pivot: 2 },
    Layout { orientation: Orientation::Right, offsets: [(-1, 0), (0, 0), (1, 0), (1, 1)], pivot: 1 },
];

#[rustfmt::skip]
static J_LAYOUTS: [Layout; 4] = [
    Layout { orientation: Orientation::Down, offsets: [(0, -1), (0, 0), (0, 1), (1, 1)], pivot: 1 },
    Layout { orientation: Orientation::Left, offsets: [(-1, 0), (0, 0), (1, -1), (1, 0)], pivot: 1 },
    Layout { orientation: Orientation::Up, offsets: [(-1, -1), (0, -1), (0, 0), (0, 1)], pivot: 2 },
    Layout { orientation: Orientation::Right, offsets: [(-1, 0), (-1, 1), (0, 0), (1, 0)], pivot: 2 },
];

// Rows below the top where a new shape is placed and pre-rotated before
// being lifted back to row 0.
const STAGING_ROW: isize = 1;

// ============================================================================
// Shape
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct ShapeId(pub u64);

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    orientation: Orientation,
    cells: Vec<usize>,
    color: ShapeColor,
    locked: bool,
    board: BoardSize,
}

impl Shape {
    /// Builds a shape at the top-center of the board, pre-rotated by
    /// `rotations` steps.
    pub fn spawn(
        id: ShapeId,
        kind: ShapeKind,
        board: BoardSize,
        color: ShapeColor,
        rotations: usize,
    ) -> Self {
        assert!(
            board.width >= MIN_BOARD_EDGE && board.height >= MIN_BOARD_EDGE,
            "board {}x{} is too small to spawn shapes",
            board.width,
            board.height
        );
        let layout = kind.spawn_layout();

        let leftmost = ((board.width - 1) / 2).saturating_sub(1) as isize;
        let (min_dc, _) = layout.column_span();
        let pivot_row = STAGING_ROW - layout.top_row();
        let pivot = pivot_row * board.width as isize + (leftmost - min_dc);

        let mut shape = Self {
            id,
            kind,
            orientation: layout.orientation,
            cells: Vec::new(),
            color,
            locked: false,
            board,
        };
        shape.commit(layout.place(pivot, board.width));
        shape.rotate_by_steps(rotations, &LockedCells::empty(board));
        shape.lift_to_top();
        shape
    }

    /// Builds a shape from explicit cells, e.g. a partly cleared remnant or a
    /// prepared board. Panics on cells outside the board.
    pub fn with_cells(
        id: ShapeId,
        kind: ShapeKind,
        orientation: Orientation,
        board: BoardSize,
        mut cells: Vec<usize>,
        color: ShapeColor,
    ) -> Self {
        assert!(
            cells.iter().all(|&cell| cell < board.cell_count()),
            "shape cells {:?} fall outside a {}x{} board",
            cells,
            board.width,
            board.height
        );
        cells.sort_unstable();
        cells.dedup();
        Self {
            id,
            kind,
            orientation,
            cells,
            color,
            locked: false,
            board,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupied cell indices in ascending order.
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn board(&self) -> BoardSize {
        self.board
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.cells.binary_search(&index).is_ok()
    }

    /// Smallest cell index, i.e. the topmost (then leftmost) cell.
    pub fn top_cell(&self) -> Option<usize> {
        self.cells.first().copied()
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    pub fn move_left(&mut self, locked: &LockedCells) -> bool {
        self.shift_sideways(-1, locked)
    }

    pub fn move_right(&mut self, locked: &LockedCells) -> bool {
        self.shift_sideways(1, locked)
    }

    /// Falls one row. A shape that cannot fall has landed and becomes locked.
    pub fn move_down(&mut self, locked: &LockedCells) -> bool {
        debug_assert_eq!(locked.board(), self.board);
        let candidate = self.shifted(self.board.width as isize);
        if out_of_bounds_or_occupied(&candidate, locked) {
            self.locked = true;
            return false;
        }
        self.commit(candidate);
        true
    }

    fn shift_sideways(&mut self, delta: isize, locked: &LockedCells) -> bool {
        debug_assert_eq!(locked.board(), self.board);
        let width = self.board.width;
        let candidate = self.shifted(delta);
        let stays_on_rows = self
            .cells
            .iter()
            .zip(&candidate)
            .all(|(&from, &to)| same_row(from as isize, to, width));
        if !stays_on_rows || out_of_bounds_or_occupied(&candidate, locked) {
            return false;
        }
        self.commit(candidate);
        true
    }

    // ------------------------------------------------------------------------
    // Rotation
    // ------------------------------------------------------------------------

    /// Advances to the next orientation of the kind's rotation cycle.
    ///
    /// The candidate is built around the pivot of the current orientation.
    /// When it wraps past the left or right edge it is kicked one column back
    /// onto the pivot's row; a candidate that still wraps, leaves the board or
    /// hits a locked cell is rejected and nothing changes.
    pub fn rotate(&mut self, locked: &LockedCells) -> bool {
        debug_assert_eq!(locked.board(), self.board);
        let Some(next) = self.kind.next_orientation(self.orientation) else {
            return false;
        };
        let (Some(current), Some(target)) =
            (self.kind.layout(self.orientation), self.kind.layout(next))
        else {
            return false;
        };
        // Remnants of a line clear no longer match their table.
        if self.cells.len() != current.offsets.len() {
            return false;
        }

        let width = self.board.width;
        let pivot = self.cells[current.pivot] as isize;
        let (min_dc, max_dc) = target.column_span();

        let kick = if !same_row(pivot, pivot + min_dc, width) {
            1
        } else if !same_row(pivot, pivot + max_dc, width) {
            -1
        } else {
            0
        };
        let pivot = pivot + kick;
        if !on_one_row(&[pivot + min_dc, pivot, pivot + max_dc], width) {
            return false;
        }

        let candidate = target.place(pivot, width);
        if out_of_bounds_or_occupied(&candidate, locked) {
            return false;
        }
        self.commit(candidate);
        self.orientation = next;
        true
    }

    /// Rotates up to `steps` times, each step accepted or rejected on its
    /// own. Returns the number of accepted steps.
    pub fn rotate_by_steps(&mut self, steps: usize, locked: &LockedCells) -> usize {
        (0..steps).filter(|_| self.rotate(locked)).count()
    }

    // ------------------------------------------------------------------------
    // Line clearing support
    // ------------------------------------------------------------------------

    /// Removes one cell and drops the part of the shape stacked above it in
    /// the same column by one row. Returns false if the cell is not part of
    /// the shape.
    pub fn remove_cell(&mut self, index: usize) -> bool {
        let Ok(position) = self.cells.binary_search(&index) else {
            return false;
        };
        self.cells.remove(position);

        let board = self.board;
        let column = board.column_of(index);
        for cell in self
            .cells
            .iter_mut()
            .filter(|cell| **cell < index && board.column_of(**cell) == column)
        {
            *cell += board.width;
        }
        self.cells.sort_unstable();
        true
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn shifted(&self, delta: isize) -> Vec<isize> {
        self.cells
            .iter()
            .map(|&cell| cell as isize + delta)
            .collect()
    }

    /// Stores a validated candidate. Callers check bounds first.
    fn commit(&mut self, candidate: Vec<isize>) {
        self.cells = candidate.into_iter().map(|cell| cell as usize).collect();
    }

    fn lift_to_top(&mut self) {
        if let Some(top) = self.top_cell() {
            let rows_up = self.board.row_of(top) * self.board.width;
            for cell in &mut self.cells {
                *cell -= rows_up;
            }
        }
    }
}
